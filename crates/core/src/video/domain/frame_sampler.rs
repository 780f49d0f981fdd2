use crate::shared::frame::Frame;
use crate::shared::rates::SkipRate;
use crate::video::domain::codec_error::CodecError;

/// Lazy stride filter over a decode sequence.
///
/// Counts frames from 0 in the order the inner iterator yields them and
/// emits `(index, frame)` whenever `index % skip_rate == 0`. The first
/// decode error is forwarded and ends the sequence.
pub struct FrameSampler<I> {
    inner: I,
    skip_rate: SkipRate,
    next_index: usize,
    failed: bool,
}

impl<I> FrameSampler<I>
where
    I: Iterator<Item = Result<Frame, CodecError>>,
{
    pub fn new(inner: I, skip_rate: SkipRate) -> Self {
        Self {
            inner,
            skip_rate,
            next_index: 0,
            failed: false,
        }
    }

    /// Number of frames consumed from the decode sequence so far.
    pub fn frames_seen(&self) -> usize {
        self.next_index
    }
}

impl<I> Iterator for FrameSampler<I>
where
    I: Iterator<Item = Result<Frame, CodecError>>,
{
    type Item = Result<(usize, Frame), CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let frame = match self.inner.next()? {
                Ok(frame) => frame,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            let index = self.next_index;
            self.next_index += 1;

            if self.skip_rate.keeps(index) {
                return Some(Ok((index, frame.with_index(index))));
            }
        }
    }
}

/// Samples `frames` on a fixed stride. See [`FrameSampler`].
pub fn sample<I>(frames: I, skip_rate: SkipRate) -> FrameSampler<I::IntoIter>
where
    I: IntoIterator<Item = Result<Frame, CodecError>>,
{
    FrameSampler::new(frames.into_iter(), skip_rate)
}
