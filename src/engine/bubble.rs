use super::{Interrupt, StepCtx};
use crate::model::ElementUpdate;

/// Adjacent compare-and-swap passes; each pass settles the largest remaining value.
pub(super) async fn sort(values: &[u32], ctx: &StepCtx) -> Result<(), Interrupt> {
    let mut arr = values.to_vec();
    let n = arr.len();

    for i in 0..n {
        ctx.checkpoint()?;

        for j in 0..n.saturating_sub(i + 1) {
            ctx.checkpoint()?;

            ctx.emit(j, ElementUpdate::selected())?;
            ctx.emit(j + 1, ElementUpdate::selected())?;
            ctx.pause().await?;

            if arr[j] > arr[j + 1] {
                arr.swap(j, j + 1);
                ctx.emit(j, ElementUpdate::value(arr[j]))?;
                ctx.emit(j + 1, ElementUpdate::value(arr[j + 1]))?;
                ctx.pause().await?;
            }

            ctx.emit(j, ElementUpdate::idle())?;
            ctx.emit(j + 1, ElementUpdate::idle())?;
        }
    }
    Ok(())
}
