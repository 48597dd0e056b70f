use super::{Interrupt, StepCtx};
use crate::model::{ElementState, ElementUpdate};
use futures::future::{BoxFuture, FutureExt};

pub(super) async fn sort(values: &[u32], ctx: &StepCtx) -> Result<(), Interrupt> {
    let mut arr = values.to_vec();
    if arr.is_empty() {
        return Ok(());
    }
    let end = arr.len() - 1;
    sort_range(&mut arr, 0, end, ctx).await
}

/// Sort `arr[start..=end]` by splitting at the midpoint and merging the halves.
fn sort_range<'a>(
    arr: &'a mut [u32],
    start: usize,
    end: usize,
    ctx: &'a StepCtx,
) -> BoxFuture<'a, Result<(), Interrupt>> {
    async move {
        ctx.checkpoint()?;
        if start >= end {
            return Ok(());
        }

        let mid = (start + end) / 2;
        sort_range(arr, start, mid, ctx).await?;
        sort_range(arr, mid + 1, end, ctx).await?;
        merge(arr, start, mid, end, ctx).await
    }
    .boxed()
}

async fn merge(
    arr: &mut [u32],
    start: usize,
    mid: usize,
    end: usize,
    ctx: &StepCtx,
) -> Result<(), Interrupt> {
    let left = arr[start..=mid].to_vec();
    let right = arr[mid + 1..=end].to_vec();
    let (mut i, mut j, mut k) = (0, 0, start);

    while i < left.len() && j < right.len() {
        ctx.checkpoint()?;

        // Right wins only on strict inequality, so ties keep left-half order.
        let v = if right[j] < left[i] {
            j += 1;
            right[j - 1]
        } else {
            i += 1;
            left[i - 1]
        };
        place(arr, k, v, ctx)?;
        k += 1;
        ctx.pause().await?;
    }

    for &v in left[i..].iter().chain(&right[j..]) {
        ctx.checkpoint()?;
        place(arr, k, v, ctx)?;
        k += 1;
        ctx.pause().await?;
    }

    for idx in start..=end {
        ctx.checkpoint()?;
        ctx.emit(idx, ElementUpdate::value(arr[idx]).with_state(ElementState::Idle))?;
    }
    Ok(())
}

fn place(arr: &mut [u32], k: usize, v: u32, ctx: &StepCtx) -> Result<(), Interrupt> {
    ctx.emit(k, ElementUpdate::value(v).with_state(ElementState::Selected))?;
    arr[k] = v;
    Ok(())
}
