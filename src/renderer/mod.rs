//! Rendering
//!
//! [`render`] turns a read-only view of the game into a [`Frame`]: a flat list
//! of screen-space draw commands plus the colour theme picked for the current
//! score. Painting the frame is up to the host (see `canvas` on the web).

use glam::Vec2;

use crate::sim::{Facing, GameState};

#[cfg(target_arch = "wasm32")]
pub mod canvas;

/// Canvas size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixels per world unit for an arena of `arena_size`
    pub fn scale(&self, arena_size: f32) -> f32 {
        self.width.min(self.height).max(0.0) / arena_size
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// World (origin-centered, y up) to screen (top-left origin, y down)
    pub fn to_screen(&self, world: Vec2, arena_size: f32) -> Vec2 {
        let scale = self.scale(arena_size);
        let center = self.center();
        Vec2::new(center.x + world.x * scale, center.y - world.y * scale)
    }
}

/// Colour set for one score tier (CSS colour strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: &'static str,
    pub arena: &'static str,
    pub player: &'static str,
    pub ball: &'static str,
    pub text: &'static str,
}

/// Themes by minimum score, ascending
const THEMES: [(u32, Theme); 5] = [
    (
        0,
        Theme {
            background: "#101018",
            arena: "#3a3a55",
            player: "#4fc3f7",
            ball: "#ffffff",
            text: "#e0e0e0",
        },
    ),
    (
        10,
        Theme {
            background: "#0f1a12",
            arena: "#2e5e3a",
            player: "#81c784",
            ball: "#fff59d",
            text: "#e8f5e9",
        },
    ),
    (
        25,
        Theme {
            background: "#1d1408",
            arena: "#6d4c1f",
            player: "#ffb74d",
            ball: "#ffe0b2",
            text: "#fff3e0",
        },
    ),
    (
        50,
        Theme {
            background: "#1f0a10",
            arena: "#7b1f3a",
            player: "#f06292",
            ball: "#fce4ec",
            text: "#fce4ec",
        },
    ),
    (
        100,
        Theme {
            background: "#140a22",
            arena: "#5e35b1",
            player: "#b388ff",
            ball: "#ffd740",
            text: "#ede7f6",
        },
    ),
];

impl Theme {
    /// Highest tier whose threshold the score has reached
    pub fn for_score(score: u32) -> Theme {
        THEMES
            .iter()
            .rev()
            .find(|(min, _)| score >= *min)
            .map(|(_, theme)| *theme)
            .unwrap_or(THEMES[0].1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// One screen-space drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: &'static str,
    },
    StrokeRect {
        min: Vec2,
        size: Vec2,
        color: &'static str,
        line_width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: &'static str,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: &'static str,
        align: TextAlign,
    },
}

/// Everything needed to paint one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub viewport: Viewport,
    pub theme: Theme,
    pub commands: Vec<DrawCommand>,
}

/// Build the frame for the current state
pub fn render(state: &GameState, viewport: Viewport) -> Frame {
    let theme = Theme::for_score(state.scoreboard.score());
    let arena_size = state.arena.size;
    let scale = viewport.scale(arena_size);
    let mut commands = Vec::with_capacity(8);

    commands.push(DrawCommand::Clear {
        color: theme.background,
    });

    // Arena outline
    let half = state.arena.half();
    let top_left = viewport.to_screen(Vec2::new(-half, half), arena_size);
    commands.push(DrawCommand::StrokeRect {
        min: top_left,
        size: Vec2::splat(arena_size * scale),
        color: theme.arena,
        line_width: 2.0,
    });

    // Paddle, with an eye looking the way it last moved
    let player = &state.player;
    let player_center = viewport.to_screen(player.pos(), arena_size);
    commands.push(DrawCommand::Circle {
        center: player_center,
        radius: player.size * scale,
        color: theme.player,
    });
    let look = match player.direction {
        Facing::Left => -1.0,
        Facing::Right => 1.0,
    };
    let eye = player.pos() + Vec2::new(look * player.size * 0.45, player.size * 0.35);
    commands.push(DrawCommand::Circle {
        center: viewport.to_screen(eye, arena_size),
        radius: player.size * 0.18 * scale,
        color: theme.background,
    });

    // Ball
    commands.push(DrawCommand::Circle {
        center: viewport.to_screen(state.ball.pos, arena_size),
        radius: state.ball.size * scale,
        color: theme.ball,
    });

    // Score, top center of the arena; best score underneath
    let text_size = (arena_size * scale * 0.08).max(12.0);
    let score_pos = viewport.to_screen(Vec2::new(0.0, half * 0.8), arena_size);
    commands.push(DrawCommand::Text {
        text: state.scoreboard.score().to_string(),
        pos: score_pos,
        size: text_size,
        color: theme.text,
        align: TextAlign::Center,
    });
    commands.push(DrawCommand::Text {
        text: format!("best {}", state.scoreboard.best()),
        pos: score_pos + Vec2::new(0.0, text_size * 0.9),
        size: text_size * 0.5,
        color: theme.text,
        align: TextAlign::Center,
    });

    Frame {
        viewport,
        theme,
        commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_theme_tiers() {
        assert_eq!(Theme::for_score(0), THEMES[0].1);
        assert_eq!(Theme::for_score(9), THEMES[0].1);
        assert_eq!(Theme::for_score(10), THEMES[1].1);
        assert_eq!(Theme::for_score(49), THEMES[2].1);
        assert_eq!(Theme::for_score(999), THEMES[4].1);
    }

    #[test]
    fn test_world_to_screen() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.scale(300.0), 2.0);
        assert_eq!(viewport.to_screen(Vec2::ZERO, 300.0), Vec2::new(400.0, 300.0));
        // Top-left corner of the arena; y flips
        assert_eq!(
            viewport.to_screen(Vec2::new(-150.0, 150.0), 300.0),
            Vec2::new(100.0, 0.0)
        );
    }

    #[test]
    fn test_frame_contents() {
        let mut state = GameState::new(Tuning::default(), 3, 21);
        for _ in 0..12 {
            state.scoreboard.add_point();
        }
        let frame = render(&state, Viewport::new(300.0, 300.0));

        assert_eq!(frame.theme, Theme::for_score(12));
        assert_eq!(frame.commands[0], DrawCommand::Clear { color: frame.theme.background });
        let texts: Vec<&str> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["12", "best 21"]);

        let ball = frame.commands.iter().any(|c| {
            matches!(c, DrawCommand::Circle { radius, color, .. }
                if *radius == state.ball.size && *color == frame.theme.ball)
        });
        assert!(ball);
    }

    #[test]
    fn test_render_is_pure() {
        let state = GameState::new(Tuning::default(), 3, 0);
        let viewport = Viewport::new(640.0, 480.0);
        assert_eq!(render(&state, viewport), render(&state, viewport));
    }
}
