use super::{Interrupt, StepCtx};
use crate::model::{ElementState, ElementUpdate};

pub(super) async fn sort(values: &[u32], ctx: &StepCtx) -> Result<(), Interrupt> {
    let mut arr = values.to_vec();
    let n = arr.len();

    for i in 0..n {
        ctx.checkpoint()?;

        let mut min = i;
        ctx.emit(min, ElementUpdate::selected())?;

        for j in (i + 1)..n {
            ctx.checkpoint()?;

            ctx.emit(j, ElementUpdate::selected())?;
            ctx.pause().await?;

            if arr[j] < arr[min] {
                ctx.emit(min, ElementUpdate::idle())?;
                min = j;
                ctx.emit(min, ElementUpdate::selected())?;
            } else {
                ctx.emit(j, ElementUpdate::idle())?;
            }
        }

        if min != i {
            arr.swap(i, min);
            ctx.emit(i, ElementUpdate::value(arr[i]).with_state(ElementState::Idle))?;
            ctx.emit(min, ElementUpdate::value(arr[min]).with_state(ElementState::Idle))?;
        } else {
            ctx.emit(i, ElementUpdate::idle())?;
        }
    }
    Ok(())
}
