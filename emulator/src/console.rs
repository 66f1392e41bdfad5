use std::sync::Mutex;

use derive_more::IsVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum DrawingStyle {
    Off,
    Normal,
    Dotted,
    Extended,
}

// The host-facing seam: where the beam goes, and the operator panel. The
// display processor reports every movement as an absolute position plus
// the style the beam had on the way there.
pub trait Console: Send + Sync {
    fn move_absolute(&self, x: u16, y: u16, style: DrawingStyle);
    fn draw_point(&self, x: u16, y: u16);
    fn frame_done(&self);

    fn data_switches(&self) -> u16 {
        0
    }

    // When false the main processor keeps its last DS value.
    fn data_switch_mapping_enabled(&self) -> bool {
        false
    }
}

pub struct NullConsole;

impl Console for NullConsole {
    fn move_absolute(&self, _x: u16, _y: u16, _style: DrawingStyle) {}
    fn draw_point(&self, _x: u16, _y: u16) {}
    fn frame_done(&self) {}
}

// Captures everything the display hands over; the test double and the
// stats sink for the CLI.
#[derive(Default)]
pub struct RecordingConsole {
    moves: Mutex<Vec<(u16, u16, DrawingStyle)>>,
    points: Mutex<Vec<(u16, u16)>>,
    frames: Mutex<usize>,
    switches: Mutex<Option<u16>>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn take_moves(&self) -> Vec<(u16, u16, DrawingStyle)> {
        std::mem::take(&mut self.moves.lock().unwrap())
    }

    pub fn take_points(&self) -> Vec<(u16, u16)> {
        std::mem::take(&mut self.points.lock().unwrap())
    }

    pub fn move_count(&self) -> usize {
        self.moves.lock().unwrap().len()
    }

    pub fn point_count(&self) -> usize {
        self.points.lock().unwrap().len()
    }

    pub fn frames(&self) -> usize {
        *self.frames.lock().unwrap()
    }

    pub fn set_switches(&self, val: u16) {
        *self.switches.lock().unwrap() = Some(val);
    }

    pub fn clear_switches(&self) {
        *self.switches.lock().unwrap() = None;
    }
}

impl Console for RecordingConsole {
    fn move_absolute(&self, x: u16, y: u16, style: DrawingStyle) {
        self.moves.lock().unwrap().push((x, y, style));
    }

    fn draw_point(&self, x: u16, y: u16) {
        self.points.lock().unwrap().push((x, y));
    }

    fn frame_done(&self) {
        *self.frames.lock().unwrap() += 1;
    }

    fn data_switches(&self) -> u16 {
        self.switches.lock().unwrap().unwrap_or(0)
    }

    fn data_switch_mapping_enabled(&self) -> bool {
        self.switches.lock().unwrap().is_some()
    }
}
