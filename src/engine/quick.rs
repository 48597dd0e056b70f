use super::{at, Interrupt, StepCtx};
use crate::model::{ElementState, ElementUpdate};
use futures::future::{BoxFuture, FutureExt};

pub(super) async fn sort(values: &[u32], ctx: &StepCtx) -> Result<(), Interrupt> {
    let mut arr = values.to_vec();
    let end = arr.len() as isize - 1;
    sort_range(&mut arr, 0, end, ctx).await
}

/// Hoare partition of `arr[start..=end]` around its middle value, then recurse on both sides.
fn sort_range<'a>(
    arr: &'a mut [u32],
    start: isize,
    end: isize,
    ctx: &'a StepCtx,
) -> BoxFuture<'a, Result<(), Interrupt>> {
    async move {
        ctx.checkpoint()?;
        if start >= end {
            return Ok(());
        }

        // Read once; later swaps may move this value elsewhere.
        let pivot = at(arr, (start + end) / 2)?;
        let (mut i, mut j) = (start, end);

        while i <= j {
            ctx.checkpoint()?;

            while at(arr, i)? < pivot {
                i += 1;
            }
            while at(arr, j)? > pivot {
                j -= 1;
            }

            if i <= j {
                let (ui, uj) = (i as usize, j as usize);
                arr.swap(ui, uj);
                ctx.emit(ui, ElementUpdate::value(arr[ui]).with_state(ElementState::Selected))?;
                ctx.emit(uj, ElementUpdate::value(arr[uj]).with_state(ElementState::Selected))?;

                ctx.pause().await?;

                ctx.emit(ui, ElementUpdate::value(arr[ui]).with_state(ElementState::Idle))?;
                ctx.emit(uj, ElementUpdate::value(arr[uj]).with_state(ElementState::Idle))?;
                i += 1;
                j -= 1;
            }
        }

        sort_range(arr, start, j, ctx).await?;
        sort_range(arr, i, end, ctx).await
    }
    .boxed()
}
