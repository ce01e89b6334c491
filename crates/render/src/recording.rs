use std::fmt;

use lge_common::{Color565, ScreenSize};

use crate::backend::DrawBackend;

/// One call made against a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    Circle {
        x: i32,
        y: i32,
        r: i32,
        color: Color565,
    },
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color565,
    },
    Triangle {
        points: [(i32, i32); 3],
        color: Color565,
    },
    Screen {
        color: Color565,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Color565,
    },
    Blit {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle { x, y, r, color } => {
                write!(f, "circle ({x}, {y}) r={r} color={:#06x}", color.0)
            }
            Self::Rect { x, y, w, h, color } => {
                write!(f, "rect ({x}, {y}) {w}x{h} color={:#06x}", color.0)
            }
            Self::Triangle { points, color } => {
                let [(x0, y0), (x1, y1), (x2, y2)] = points;
                write!(
                    f,
                    "triangle ({x0}, {y0}) ({x1}, {y1}) ({x2}, {y2}) color={:#06x}",
                    color.0
                )
            }
            Self::Screen { color } => write!(f, "screen color={:#06x}", color.0),
            Self::Text { x, y, text, color } => {
                write!(f, "text ({x}, {y}) {text:?} color={:#06x}", color.0)
            }
            Self::Blit { x, y, w, h } => write!(f, "blit ({x}, {y}) {w}x{h}"),
        }
    }
}

/// Backend that records calls instead of drawing.
///
/// Useful for asserting exact draw order and for human-readable dumps of
/// what a frame would send to the display.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    size: ScreenSize,
    commands: Vec<DrawCommand>,
}

impl RecordingBackend {
    pub fn new(size: ScreenSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain and return the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded triangles with their colors, in draw order.
    pub fn triangles(&self) -> Vec<([(i32, i32); 3], Color565)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Triangle { points, color } => Some((*points, *color)),
                _ => None,
            })
            .collect()
    }

    /// Human-readable listing of every recorded command.
    pub fn dump(&self) -> String {
        let mut out = format!(
            "=== {} commands ({}x{}) ===\n",
            self.commands.len(),
            self.size.width,
            self.size.height
        );
        for cmd in &self.commands {
            out.push_str(&format!("  {cmd}\n"));
        }
        out
    }
}

impl DrawBackend for RecordingBackend {
    fn size(&self) -> ScreenSize {
        self.size
    }

    fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Color565) {
        self.commands.push(DrawCommand::Circle { x, y, r, color });
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color565) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
    }

    fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color565,
    ) {
        self.commands.push(DrawCommand::Triangle {
            points: [(x0, y0), (x1, y1), (x2, y2)],
            color,
        });
    }

    fn fill_screen(&mut self, color: Color565) {
        self.commands.push(DrawCommand::Screen { color });
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color565) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }

    fn blit_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.commands.push(DrawCommand::Blit { x, y, w, h });
    }
}
