use evade_core::{MovementController, SurfaceProjector, Vec3};

/// Reference movement controller: walks straight at its destination.
///
/// Path planning is the host's concern; this exists so the scanner can be driven end to end in
/// simulations and tests. Positions are optionally re-snapped onto a walkable surface.
#[derive(Debug, Clone)]
pub struct StraightMover {
    position: Vec3,
    destination: Option<Vec3>,
    speed: f32,
    arrival_distance: f32,
    requests: u32,
}

impl StraightMover {
    pub fn new(position: Vec3, speed: f32, arrival_distance: f32) -> Self {
        Self {
            position,
            destination: None,
            speed,
            arrival_distance,
            requests: 0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Number of destination updates received so far.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn arrived(&self) -> bool {
        match self.destination {
            Some(goal) => self.position.distance(goal) <= self.arrival_distance,
            None => true,
        }
    }

    /// Advance by `dt_seconds`. Returns the new position.
    pub fn step(&mut self, dt_seconds: f32) -> Vec3 {
        let Some(goal) = self.destination else {
            return self.position;
        };

        let to_goal = goal - self.position;
        let dist = to_goal.length();
        if dist <= self.arrival_distance.max(0.0) || dist <= f32::EPSILON {
            return self.position;
        }

        let travel = self.speed.max(0.0) * dt_seconds.max(0.0);
        if travel >= dist {
            self.position = goal;
        } else {
            self.position += to_goal * (travel / dist);
        }
        self.position
    }

    /// Like [`step`](Self::step), then snaps onto `surface` within `snap_radius`.
    pub fn step_on(
        &mut self,
        dt_seconds: f32,
        surface: &dyn SurfaceProjector,
        snap_radius: f32,
    ) -> Vec3 {
        let p = self.step(dt_seconds);
        if let Some(snapped) = surface.project(p, snap_radius) {
            self.position = snapped;
        }
        self.position
    }
}

impl MovementController for StraightMover {
    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.requests = self.requests.saturating_add(1);
    }
}

/// Walks a looping list of waypoints at constant speed.
///
/// Used to drive a pursuer in simulations: once within `stopping_distance` of the current
/// waypoint it advances to the next, wrapping back to the first.
#[derive(Debug, Clone)]
pub struct WaypointPatrol {
    waypoints: Vec<Vec3>,
    current: usize,
    speed: f32,
    stopping_distance: f32,
    warned_empty: bool,
}

impl WaypointPatrol {
    pub fn new(waypoints: Vec<Vec3>, speed: f32, stopping_distance: f32) -> Self {
        Self {
            waypoints,
            current: 0,
            speed,
            stopping_distance,
            warned_empty: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Move `position` toward the current waypoint. Returns the new position.
    pub fn step(&mut self, position: Vec3, dt_seconds: f32) -> Vec3 {
        if self.waypoints.is_empty() {
            if !self.warned_empty {
                tracing::warn!("waypoint patrol has no waypoints");
                self.warned_empty = true;
            }
            return position;
        }

        let target = self.waypoints[self.current];
        let to_target = target - position;
        let dist = to_target.length();

        if dist > self.stopping_distance.max(0.0) {
            let travel = (self.speed.max(0.0) * dt_seconds.max(0.0)).min(dist);
            return position + to_target * (travel / dist);
        }

        self.current = (self.current + 1) % self.waypoints.len();
        position
    }
}
