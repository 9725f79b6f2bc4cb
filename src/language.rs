//! Mid-call language switching
//!
//! The LLM exposes a `change_language` function on every call. When it
//! fires, the pipeline's TTS service is reconfigured for the requested
//! language. Lookups are by human-readable name because that is what the
//! model passes.

use crate::call_tree::{Directive, ServiceOption};

/// Pipeline configuration for one supported language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageProfile {
    pub name: &'static str,
    pub code: &'static str,
    pub tts_model: &'static str,
    /// Only applied at call start. Swapping the STT model mid-call breaks
    /// live transcription, so switches leave it alone.
    #[allow(dead_code)]
    pub stt_model: &'static str,
    pub voice_id: &'static str,
}

pub const LANGUAGES: &[LanguageProfile] = &[
    LanguageProfile {
        name: "english",
        code: "en-US",
        tts_model: "sonic-english",
        stt_model: "nova-2-conversationalai",
        voice_id: "79a125e8-cd45-4c13-8a67-188112f4dd22",
    },
    LanguageProfile {
        name: "french",
        code: "fr",
        tts_model: "sonic-multilingual",
        stt_model: "nova-2-general",
        voice_id: "a8a1eb38-5f15-4c1d-8722-7ac0f329727d",
    },
    LanguageProfile {
        name: "spanish",
        code: "es",
        tts_model: "sonic-multilingual",
        stt_model: "nova-2-general",
        voice_id: "846d6cb0-2301-48b6-9683-48f5618ea2f6",
    },
    LanguageProfile {
        name: "german",
        code: "de",
        tts_model: "sonic-multilingual",
        stt_model: "nova-2-general",
        voice_id: "b9de4a89-2257-424b-94c2-db18ba68c81a",
    },
];

/// Case-insensitive lookup by name ("english", "French", ...).
pub fn profile(name: &str) -> Option<&'static LanguageProfile> {
    let name = name.to_ascii_lowercase();
    LANGUAGES.iter().find(|p| p.name == name)
}

/// Directive retargeting the TTS service at `profile`.
pub fn switch_directive(profile: &LanguageProfile) -> Directive {
    Directive::UpdateServiceConfig {
        service: "tts".to_string(),
        options: vec![
            ServiceOption::new("voice", profile.voice_id),
            ServiceOption::new("model", profile.tts_model),
            ServiceOption::new("language", profile.code),
        ],
    }
}
