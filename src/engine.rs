use std::time::Duration;

use crate::demo::DemoState;

/// Longest step the simulation takes in one frame, so a stalled frame does not
/// fling the camera across the map.
const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

pub fn update(state: &mut DemoState, delta_time: Duration) -> anyhow::Result<()> {
    state.update(delta_time.min(MAX_FRAME_TIME).as_secs_f32());

    Ok(())
}
