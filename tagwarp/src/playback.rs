//! Pacing of the source video against the camera frames.
//!
//! The source only advances on frames where the overlay succeeded, so it
//! pauses while the anchors are out of view. A bounded look-ahead queue is
//! kept topped up from the source one frame per iteration.

use std::collections::VecDeque;
use std::iter::Fuse;

/// Default look-ahead depth.
pub const DEFAULT_CAPACITY: usize = 128;

/// Bounded FIFO of upcoming source frames.
pub struct SourceQueue<I: Iterator> {
    source: Fuse<I>,
    queue: VecDeque<I::Item>,
    current: Option<I::Item>,
    capacity: usize,
}

impl<I> SourceQueue<I>
where
    I: Iterator,
    I::Item: Clone,
{
    /// Prime the queue with the first source frame.
    ///
    /// The first frame becomes the current frame and is also queued, so the
    /// first successful overlay shows it twice before moving on.
    pub fn new(source: I, capacity: usize) -> Self {
        let mut source = source.fuse();
        let mut queue = VecDeque::with_capacity(capacity.max(1));
        let current = source.next();
        if let Some(first) = &current {
            queue.push_back(first.clone());
        }
        Self {
            source,
            queue,
            current,
            capacity: capacity.max(1),
        }
    }

    /// Frame to warp on this iteration.
    pub fn current(&self) -> Option<&I::Item> {
        self.current.as_ref()
    }

    /// Move to the next queued frame. Call only after a successful overlay.
    pub fn advance(&mut self) {
        if let Some(next) = self.queue.pop_front() {
            self.current = Some(next);
        }
    }

    /// Pull one more frame from the source if there is room.
    ///
    /// Returns whether a frame was queued.
    pub fn refill(&mut self) -> bool {
        if self.queue.len() >= self.capacity {
            return false;
        }
        match self.source.next() {
            Some(frame) => {
                self.queue.push_back(frame);
                true
            }
            None => false,
        }
    }

    /// One loop iteration's bookkeeping: advance on success, then refill.
    pub fn step(&mut self, overlaid: bool) {
        if overlaid {
            self.advance();
        }
        self.refill();
    }

    /// Frames waiting behind the current one.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Playback is over once the queue has drained.
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }
}
