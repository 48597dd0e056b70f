use super::{Interrupt, StepCtx};
use crate::model::{ElementState, ElementUpdate};

pub(super) async fn sort(values: &[u32], ctx: &StepCtx) -> Result<(), Interrupt> {
    let mut arr = values.to_vec();

    for i in 1..arr.len() {
        ctx.checkpoint()?;

        let current = arr[i];
        // `slot` is where `current` lands once every larger predecessor has shifted right.
        let mut slot = i;
        ctx.emit(i, ElementUpdate::value(current).with_state(ElementState::Selected))?;

        while slot > 0 && current < arr[slot - 1] {
            ctx.checkpoint()?;

            arr[slot] = arr[slot - 1];
            ctx.emit(
                slot,
                ElementUpdate::value(arr[slot]).with_state(ElementState::Selected),
            )?;
            slot -= 1;
            ctx.pause().await?;
            ctx.emit(
                slot + 1,
                ElementUpdate::value(arr[slot + 1]).with_state(ElementState::Idle),
            )?;
        }

        arr[slot] = current;
        ctx.emit(slot, ElementUpdate::value(current).with_state(ElementState::Idle))?;
    }
    Ok(())
}
