use crate::domain::{HitRequest, HitResolver, ResolveError, ThrowOutcome};
use async_trait::async_trait;

// In-process resolver used when no hit-test service is configured.
// Splits the horizontal aim range [-half_width, half_width) into equal lanes, one per target,
// and hits whichever lane the thrower's scaled aim falls in.
#[derive(Debug, Clone, Copy)]
pub struct LaneResolver {
    lanes: usize,
    half_width: f32,
}

impl LaneResolver {
    pub fn new(lanes: usize, half_width: f32) -> Self {
        Self { lanes, half_width }
    }

    pub fn lane_for(&self, aim_x: f32) -> Option<usize> {
        if self.lanes == 0 || !aim_x.is_finite() || self.half_width <= 0.0 {
            return None;
        }
        let t = (aim_x + self.half_width) / (2.0 * self.half_width);
        if !(0.0..1.0).contains(&t) {
            return None;
        }
        Some(((t * self.lanes as f32) as usize).min(self.lanes - 1))
    }
}

#[async_trait]
impl HitResolver for LaneResolver {
    async fn resolve(&self, request: HitRequest) -> Result<ThrowOutcome, ResolveError> {
        Ok(match self.lane_for(request.aim.x) {
            Some(lane) => ThrowOutcome::Hit(lane),
            None => ThrowOutcome::Miss,
        })
    }
}
