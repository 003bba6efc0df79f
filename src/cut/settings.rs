use crate::math::POSITION_EPSILON;

/// When a cut session reports that its path should close itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// Close when the last point lands on the first one.
    ClickToStart,
    /// Close when both the first and the last point touch the face boundary.
    EdgeConnection,
    /// Either of the above.
    #[default]
    Both,
    /// Never close automatically.
    Manual,
}

impl ClosePolicy {
    fn click_to_start(self) -> bool {
        matches!(self, Self::ClickToStart | Self::Both)
    }

    fn edge_connection(self) -> bool {
        matches!(self, Self::EdgeConnection | Self::Both)
    }
}

/// Tunables for placing and committing a cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutSettings {
    /// Snap distance from a placed point to a boundary vertex or edge.
    pub vertex_snap_distance: f64,
    /// Snap distance from a placed point to an earlier point of the path.
    pub path_snap_distance: f64,
    /// Distance under which a committed point resolves to an existing vertex.
    pub weld_epsilon: f64,
    /// Auto-close policy.
    pub close_policy: ClosePolicy,
    /// Close a path touching the boundary once back to its first point.
    pub connect_to_start: bool,
    /// Also emit the inside of a hole cut as its own face.
    pub fill_hole: bool,
}

impl Default for CutSettings {
    fn default() -> Self {
        Self {
            vertex_snap_distance: 0.1,
            path_snap_distance: 0.1,
            weld_epsilon: POSITION_EPSILON,
            close_policy: ClosePolicy::default(),
            connect_to_start: true,
            fill_hole: false,
        }
    }
}

impl CutSettings {
    #[must_use]
    pub fn with_vertex_snap_distance(mut self, distance: f64) -> Self {
        self.vertex_snap_distance = distance;
        self
    }

    #[must_use]
    pub fn with_path_snap_distance(mut self, distance: f64) -> Self {
        self.path_snap_distance = distance;
        self
    }

    #[must_use]
    pub fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_close_policy(mut self, policy: ClosePolicy) -> Self {
        self.close_policy = policy;
        self
    }

    #[must_use]
    pub fn with_connect_to_start(mut self, connect: bool) -> Self {
        self.connect_to_start = connect;
        self
    }

    #[must_use]
    pub fn with_fill_hole(mut self, fill: bool) -> Self {
        self.fill_hole = fill;
        self
    }

    pub(crate) fn closes_on_click_to_start(&self) -> bool {
        self.close_policy.click_to_start()
    }

    pub(crate) fn closes_on_edge_connection(&self) -> bool {
        self.close_policy.edge_connection()
    }
}
