use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::{BatchRun, Progress, RunStatus};
use crate::encoder::Encoder;

/// Drives `run` to a terminal status.
///
/// `observe` receives a progress snapshot after every chunk, including the
/// final one. Between chunks control is handed back to the scheduler so other
/// tasks, such as the one holding the token, get to run.
pub async fn drive<E, R, F>(
    run: &mut BatchRun<E, R>,
    token: &CancellationToken,
    mut observe: F,
) -> RunStatus
where
    E: Encoder,
    R: Rng,
    F: FnMut(&Progress),
{
    loop {
        let done = run.step(token).is_terminal();
        observe(&run.progress());
        if done {
            return run.status().clone();
        }
        tokio::task::yield_now().await;
    }
}
