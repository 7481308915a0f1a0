pub mod pes;

pub use pes::read_pes_file;

/// Operation tag for one stitch command. Closed set: rendering replays
/// these in original order and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchOp {
    /// Draw a segment from the current anchor to this coordinate.
    Stitch,
    /// Move the anchor without drawing.
    Jump,
    /// Advance the stroke palette; resets the anchor without drawing.
    ColorChange,
    /// Cut the thread. Breaks the path: the next stitch must not connect.
    Trim,
    /// Machine stop. Treated like a trim for rendering purposes.
    Stop,
}

/// One ordered unit in a design's stitch sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchCommand {
    pub x: f32,
    pub y: f32,
    pub op: StitchOp,
}

impl StitchCommand {
    pub fn new(x: f32, y: f32, op: StitchOp) -> Self {
        Self { x, y, op }
    }

    pub fn stitch(x: f32, y: f32) -> Self {
        Self::new(x, y, StitchOp::Stitch)
    }

    pub fn jump(x: f32, y: f32) -> Self {
        Self::new(x, y, StitchOp::Jump)
    }
}
