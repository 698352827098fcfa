use core::marker::PhantomData;

use crate::colors::{BLACK, Color};
use crate::engine::Animation;
use crate::pixels::PixelBuffer;
use crate::types::AnimationError;

#[derive(Debug, Clone)]
pub struct NextGenSettings<G> {
    /// Prototype generator; every run starts from a fresh clone.
    pub generator: G,
    /// Black pixels inserted after each generated color.
    pub blanks: u16,
}

impl<G> NextGenSettings<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            blanks: 0,
        }
    }
}

/// Runtime state of [`NextGen`].
#[derive(Debug, Clone)]
pub struct NextGenState<G> {
    generator: Option<G>,
    gap: u16,
}

impl<G> Default for NextGenState<G> {
    fn default() -> Self {
        Self {
            generator: None,
            gap: 0,
        }
    }
}

/// Scrolls the strip one pixel per frame and feeds the next generated color in
/// at pixel 0.
///
/// A finite generator is restarted from the prototype when it runs dry.
#[derive(Debug)]
pub struct NextGen<G> {
    _generator: PhantomData<fn() -> G>,
}

impl<G> NextGen<G> {
    pub const fn new() -> Self {
        Self {
            _generator: PhantomData,
        }
    }
}

impl<G> Default for NextGen<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> NextGen<G>
where
    G: Iterator<Item = Color> + Clone,
{
    fn next_color(settings: &NextGenSettings<G>, state: &mut NextGenState<G>) -> Color {
        if state.gap > 0 {
            state.gap -= 1;
            return BLACK;
        }
        state.gap = settings.blanks;
        let generator = state
            .generator
            .get_or_insert_with(|| settings.generator.clone());
        match generator.next() {
            Some(color) => color,
            None => {
                let mut fresh = settings.generator.clone();
                let color = fresh.next().unwrap_or(BLACK);
                *generator = fresh;
                color
            }
        }
    }
}

impl<G> Animation for NextGen<G>
where
    G: Iterator<Item = Color> + Clone,
{
    type Settings = NextGenSettings<G>;
    type State = NextGenState<G>;

    fn setup<const CAP: usize>(
        &mut self,
        settings: &NextGenSettings<G>,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<NextGenState<G>, AnimationError> {
        let mut state = NextGenState {
            generator: Some(settings.generator.clone()),
            gap: 0,
        };
        // Prefill back to front so the first frame continues the sequence
        for i in (0..pixels.active_len()).rev() {
            let color = Self::next_color(settings, &mut state);
            pixels.set(i, color)?;
        }
        Ok(state)
    }

    fn calc_frame<const CAP: usize>(
        &mut self,
        settings: &NextGenSettings<G>,
        state: &mut NextGenState<G>,
        pixels: &mut PixelBuffer<CAP>,
    ) -> Result<(), AnimationError> {
        pixels.scroll(1);
        let color = Self::next_color(settings, state);
        pixels.set(0, color)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLUE, GREEN, RED};
    use crate::generators::StripedColorWheel;

    type Palette = core::iter::Copied<core::slice::Iter<'static, Color>>;

    static RGB: [Color; 3] = [RED, GREEN, BLUE];

    fn palette() -> Palette {
        RGB.iter().copied()
    }

    #[test]
    fn setup_prefills_so_sequence_continues() {
        let mut anim = NextGen::<Palette>::new();
        let mut pixels = PixelBuffer::<15>::rgb(5).unwrap();
        let settings = NextGenSettings::new(palette());
        let mut state = anim.setup(&settings, &mut pixels).unwrap();
        // R G B R G written from the end toward pixel 0
        assert_eq!(pixels.get(4).unwrap(), RED);
        assert_eq!(pixels.get(0).unwrap(), GREEN);

        anim.calc_frame(&settings, &mut state, &mut pixels).unwrap();
        assert_eq!(pixels.get(0).unwrap(), BLUE);
        assert_eq!(pixels.get(1).unwrap(), GREEN);
    }

    #[test]
    fn finite_generator_restarts_from_prototype() {
        let mut anim = NextGen::<Palette>::new();
        let mut pixels = PixelBuffer::<6>::rgb(2).unwrap();
        let settings = NextGenSettings::new(palette());
        let mut state = anim.setup(&settings, &mut pixels).unwrap();
        anim.calc_frame(&settings, &mut state, &mut pixels).unwrap();
        assert_eq!(pixels.get(0).unwrap(), BLUE);
        anim.calc_frame(&settings, &mut state, &mut pixels).unwrap();
        assert_eq!(pixels.get(0).unwrap(), RED);
    }

    #[test]
    fn blanks_insert_black_gaps() {
        let mut anim = NextGen::<StripedColorWheel>::new();
        let mut pixels = PixelBuffer::<30>::rgb(10).unwrap();
        let settings = NextGenSettings {
            generator: StripedColorWheel::new(0, 1, 10).unwrap(),
            blanks: 2,
        };
        anim.setup(&settings, &mut pixels).unwrap();
        let lit: heapless::Vec<bool, 10> = pixels.iter().map(|c| !c.is_black()).collect();
        assert_eq!(
            lit.as_slice(),
            &[true, false, false, true, false, false, true, false, false, true]
        );
    }
}
