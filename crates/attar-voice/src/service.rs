use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use std::time::Duration;

/// Issues LiveKit join tokens for voice calls.
#[derive(Debug)]
pub struct VoiceService {
    config: LiveKitConfig,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_complete()
    }

    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    /// Mints a token letting `participant_identity` join `room_name` with
    /// publish, subscribe and data permissions. The identity doubles as the
    /// display name.
    pub fn generate_join_token(
        &self,
        room_name: &str,
        participant_identity: &str,
    ) -> Result<String, VoiceError> {
        if !self.is_enabled() {
            return Err(VoiceError::Config(
                "LiveKit url, api key and api secret must be set".to_string(),
            ));
        }
        if room_name.is_empty() || participant_identity.is_empty() {
            return Err(VoiceError::Config(
                "room name and participant identity are required".to_string(),
            ));
        }

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(participant_identity)
            .with_name(participant_identity)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        token.to_jwt().map_err(VoiceError::LiveKit)
    }
}
