use rapier::geometry::Ray;
use rapier::math::{Point, Real};

/// Port shared by convention between the client and the server builds.
pub const DEFAULT_PORT: u16 = 2655;

/// Byte written by the server right after accepting a connection, when the
/// handshake acknowledgement is enabled on both ends.
pub const ACK_BYTE: u8 = 0x06;

/// A line segment to test against the server's world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastQuery {
    pub start: Point<Real>,
    pub end: Point<Real>,
}

impl RaycastQuery {
    pub fn new(start: Point<Real>, end: Point<Real>) -> Self {
        Self { start, end }
    }

    /// Ray covering the segment for times of impact in `[0, 1]`.
    pub fn ray(&self) -> Ray {
        Ray::new(self.start, self.end - self.start)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}
