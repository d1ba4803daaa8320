//! Sound clip playback
//!
//! Clips are registered by name and played fire-and-forget. Each clip owns a
//! small pool of voices; a play request takes an idle voice, grows the pool up
//! to the per-clip limit, or is dropped. Failures are logged, never returned to
//! the game loop.

use std::collections::HashMap;
use std::fmt;

use crate::consts::MAX_VOICES_PER_CLIP;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits paddle
    PaddleHit,
    /// Ball hits a wall or the ceiling
    WallHit,
    /// Ball dropped out of the arena
    GameOver,
    /// New best score
    NewBest,
}

impl SoundEffect {
    /// Registered clip name
    pub fn clip_name(&self) -> &'static str {
        match self {
            SoundEffect::PaddleHit => "bounce",
            SoundEffect::WallHit => "wall",
            SoundEffect::GameOver => "drop",
            SoundEffect::NewBest => "best",
        }
    }

    /// Default asset path, relative to the page
    pub fn default_src(&self) -> &'static str {
        match self {
            SoundEffect::PaddleHit => "sounds/bounce.wav",
            SoundEffect::WallHit => "sounds/wall.wav",
            SoundEffect::GameOver => "sounds/drop.wav",
            SoundEffect::NewBest => "sounds/best.wav",
        }
    }

    pub fn all() -> [SoundEffect; 4] {
        [
            SoundEffect::PaddleHit,
            SoundEffect::WallHit,
            SoundEffect::GameOver,
            SoundEffect::NewBest,
        ]
    }

    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::PaddleHit => SoundEffect::PaddleHit,
            GameEvent::WallHit | GameEvent::CeilingHit => SoundEffect::WallHit,
            GameEvent::GameOver { .. } => SoundEffect::GameOver,
            GameEvent::NewBest { .. } => SoundEffect::NewBest,
        }
    }
}

/// Audio failures, logged by [`SoundHandler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    Load { name: String, reason: String },
    Play { name: String, reason: String },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Load { name, reason } => {
                write!(f, "could not load sound '{}': {}", name, reason)
            }
            AudioError::Play { name, reason } => {
                write!(f, "failed to play sound '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for AudioError {}

/// One playable instance of a clip
pub trait Voice {
    /// Still playing a previous request
    fn is_busy(&self) -> bool;
    /// Rewind and start playing at `volume` (0.0 - 1.0)
    fn start(&mut self, volume: f32) -> Result<(), String>;
}

/// Creates voices for clip sources
pub trait ClipBackend {
    type Voice: Voice;
    fn load(&mut self, src: &str) -> Result<Self::Voice, String>;
}

/// What a play request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Started,
    /// Every voice of the clip was busy
    Dropped,
    /// No clip registered under that name
    Missing,
    Failed,
    Muted,
}

struct Clip<V> {
    src: String,
    voices: Vec<V>,
}

/// Named clip player with a per-clip voice limit
pub struct SoundHandler<B: ClipBackend> {
    backend: B,
    clips: HashMap<String, Clip<B::Voice>>,
    max_voices: usize,
    volume: f32,
    muted: bool,
}

impl<B: ClipBackend> SoundHandler<B> {
    pub fn new(backend: B) -> Self {
        Self::with_max_voices(backend, MAX_VOICES_PER_CLIP)
    }

    pub fn with_max_voices(backend: B, max_voices: usize) -> Self {
        Self {
            backend,
            clips: HashMap::new(),
            max_voices: max_voices.max(1),
            volume: 1.0,
            muted: false,
        }
    }

    /// Register a clip; a clip that fails to load is logged and skipped
    pub fn add_sound(&mut self, src: &str, name: &str) {
        match self.backend.load(src) {
            Ok(voice) => {
                self.clips.insert(
                    name.to_string(),
                    Clip {
                        src: src.to_string(),
                        voices: vec![voice],
                    },
                );
            }
            Err(reason) => {
                let err = AudioError::Load {
                    name: name.to_string(),
                    reason,
                };
                log::error!("{}", err);
            }
        }
    }

    /// Register every game sound at its default path
    pub fn add_defaults(&mut self) {
        for effect in SoundEffect::all() {
            self.add_sound(effect.default_src(), effect.clip_name());
        }
    }

    pub fn delete_sound(&mut self, name: &str) {
        self.clips.remove(name);
    }

    pub fn clear_sounds(&mut self) {
        self.clips.clear();
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Voices currently allocated for a clip
    pub fn voice_count(&self, name: &str) -> usize {
        self.clips.get(name).map(|c| c.voices.len()).unwrap_or(0)
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Play a clip by name without waiting for it
    pub fn play_sound(&mut self, name: &str) -> PlayOutcome {
        if self.muted || self.volume <= 0.0 {
            return PlayOutcome::Muted;
        }

        let Some(clip) = self.clips.get_mut(name) else {
            log::error!("Tried to play sound '{}' and it was not found", name);
            return PlayOutcome::Missing;
        };

        let idle = clip.voices.iter().position(|v| !v.is_busy());
        let index = match idle {
            Some(i) => i,
            None if clip.voices.len() < self.max_voices => match self.backend.load(&clip.src) {
                Ok(voice) => {
                    clip.voices.push(voice);
                    clip.voices.len() - 1
                }
                Err(reason) => {
                    let err = AudioError::Load {
                        name: name.to_string(),
                        reason,
                    };
                    log::error!("{}", err);
                    return PlayOutcome::Failed;
                }
            },
            None => {
                log::debug!("Dropping sound '{}': all {} voices busy", name, self.max_voices);
                return PlayOutcome::Dropped;
            }
        };

        match clip.voices[index].start(self.volume) {
            Ok(()) => PlayOutcome::Started,
            Err(reason) => {
                let err = AudioError::Play {
                    name: name.to_string(),
                    reason,
                };
                log::error!("{}", err);
                PlayOutcome::Failed
            }
        }
    }

    /// Play the clip bound to a sound effect
    pub fn play(&mut self, effect: SoundEffect) -> PlayOutcome {
        self.play_sound(effect.clip_name())
    }
}

/// Backend that plays nothing (native runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBackend;

/// Voice of [`SilentBackend`]; never busy
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentVoice;

impl Voice for SilentVoice {
    fn is_busy(&self) -> bool {
        false
    }

    fn start(&mut self, _volume: f32) -> Result<(), String> {
        Ok(())
    }
}

impl ClipBackend for SilentBackend {
    type Voice = SilentVoice;

    fn load(&mut self, _src: &str) -> Result<SilentVoice, String> {
        Ok(SilentVoice)
    }
}

/// `<audio>` element backend
#[cfg(target_arch = "wasm32")]
pub mod web {
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlAudioElement;

    use super::{ClipBackend, Voice};

    #[derive(Debug, Clone, Copy, Default)]
    pub struct HtmlAudioBackend;

    pub struct HtmlAudioVoice {
        element: HtmlAudioElement,
    }

    impl Voice for HtmlAudioVoice {
        fn is_busy(&self) -> bool {
            !self.element.paused() && !self.element.ended()
        }

        fn start(&mut self, volume: f32) -> Result<(), String> {
            self.element.set_current_time(0.0);
            self.element.set_volume(volume as f64);
            let promise = self.element.play().map_err(|e| format!("{:?}", e))?;
            // Autoplay rejections arrive later; log them instead of surfacing
            let on_reject = Closure::once(move |e: JsValue| {
                log::warn!("Audio playback rejected: {:?}", e);
            });
            let _ = promise.catch(&on_reject);
            on_reject.forget();
            Ok(())
        }
    }

    impl ClipBackend for HtmlAudioBackend {
        type Voice = HtmlAudioVoice;

        fn load(&mut self, src: &str) -> Result<HtmlAudioVoice, String> {
            let element = HtmlAudioElement::new_with_src(src).map_err(|e| format!("{:?}", e))?;
            element.set_preload("auto");
            Ok(HtmlAudioVoice { element })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Voices stay busy until the test says playback ended
    #[derive(Default, Clone)]
    struct Scripted {
        busy: Rc<RefCell<Vec<bool>>>,
        fail_load: bool,
        fail_start: bool,
    }

    struct ScriptedVoice {
        slot: usize,
        busy: Rc<RefCell<Vec<bool>>>,
        fail_start: bool,
    }

    impl Voice for ScriptedVoice {
        fn is_busy(&self) -> bool {
            self.busy.borrow()[self.slot]
        }

        fn start(&mut self, _volume: f32) -> Result<(), String> {
            if self.fail_start {
                return Err("NotAllowedError".to_string());
            }
            self.busy.borrow_mut()[self.slot] = true;
            Ok(())
        }
    }

    impl ClipBackend for Scripted {
        type Voice = ScriptedVoice;

        fn load(&mut self, src: &str) -> Result<ScriptedVoice, String> {
            if self.fail_load {
                return Err(format!("404 {}", src));
            }
            let mut busy = self.busy.borrow_mut();
            busy.push(false);
            Ok(ScriptedVoice {
                slot: busy.len() - 1,
                busy: self.busy.clone(),
                fail_start: self.fail_start,
            })
        }
    }

    impl Scripted {
        fn finish_all(&self) {
            self.busy.borrow_mut().iter_mut().for_each(|b| *b = false);
        }
    }

    #[test]
    fn test_voice_cap_drops_extra_requests() {
        let backend = Scripted::default();
        let mut sounds = SoundHandler::new(backend.clone());
        sounds.add_sound("bounce.wav", "bounce");

        for _ in 0..3 {
            assert_eq!(sounds.play_sound("bounce"), PlayOutcome::Started);
        }
        assert_eq!(sounds.voice_count("bounce"), 3);
        assert_eq!(sounds.play_sound("bounce"), PlayOutcome::Dropped);

        backend.finish_all();
        assert_eq!(sounds.play_sound("bounce"), PlayOutcome::Started);
        assert_eq!(sounds.voice_count("bounce"), 3);
    }

    #[test]
    fn test_idle_voice_is_reused() {
        let backend = Scripted::default();
        let mut sounds = SoundHandler::new(backend.clone());
        sounds.add_sound("wall.wav", "wall");
        sounds.play_sound("wall");
        backend.finish_all();
        sounds.play_sound("wall");
        assert_eq!(sounds.voice_count("wall"), 1);
    }

    #[test]
    fn test_missing_sound_is_noop() {
        let mut sounds = SoundHandler::new(Scripted::default());
        assert_eq!(sounds.play_sound("nope"), PlayOutcome::Missing);
    }

    #[test]
    fn test_failed_load_skips_clip() {
        let backend = Scripted {
            fail_load: true,
            ..Default::default()
        };
        let mut sounds = SoundHandler::new(backend);
        sounds.add_sound("missing.wav", "bounce");
        assert!(!sounds.has_sound("bounce"));
        assert_eq!(sounds.play_sound("bounce"), PlayOutcome::Missing);
    }

    #[test]
    fn test_failed_start_is_reported_not_raised() {
        let backend = Scripted {
            fail_start: true,
            ..Default::default()
        };
        let mut sounds = SoundHandler::new(backend);
        sounds.add_sound("bounce.wav", "bounce");
        assert_eq!(sounds.play_sound("bounce"), PlayOutcome::Failed);
    }

    #[test]
    fn test_mute_and_delete() {
        let mut sounds = SoundHandler::new(Scripted::default());
        sounds.add_defaults();
        assert!(sounds.has_sound("drop"));

        sounds.set_muted(true);
        assert!(sounds.is_muted());
        assert_eq!(sounds.play(SoundEffect::GameOver), PlayOutcome::Muted);
        sounds.set_muted(false);
        assert!(!sounds.is_muted());
        assert_eq!(sounds.play(SoundEffect::GameOver), PlayOutcome::Started);

        sounds.delete_sound("drop");
        assert_eq!(sounds.play(SoundEffect::GameOver), PlayOutcome::Missing);
        sounds.clear_sounds();
        assert!(!sounds.has_sound("bounce"));
    }

    #[test]
    fn test_events_map_to_clips() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::CeilingHit).clip_name(),
            "wall"
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::NewBest { score: 3 }),
            SoundEffect::NewBest
        );
    }
}
