use super::{Interrupt, StepCtx};
use crate::model::{ElementState, ElementUpdate};
use crate::numeric::{digit_at, digit_count};

/// LSD radix sort over decimal digits with ten stable buckets per pass.
pub(super) async fn sort(values: &[u32], ctx: &StepCtx) -> Result<(), Interrupt> {
    let mut arr = values.to_vec();
    let passes = digit_count(&arr);

    for place in 0..passes {
        ctx.checkpoint()?;

        let mut buckets: [Vec<u32>; 10] = Default::default();
        for &v in &arr {
            ctx.checkpoint()?;
            buckets[digit_at(v, place) as usize].push(v);
        }
        arr = buckets.concat();

        for (i, &v) in arr.iter().enumerate() {
            ctx.checkpoint()?;
            ctx.emit(i, ElementUpdate::value(v).with_state(ElementState::Selected))?;
            ctx.pause().await?;
            ctx.emit(i, ElementUpdate::value(v).with_state(ElementState::Idle))?;
        }
    }
    Ok(())
}
