use super::InputEvent;

/// Fixed-capacity ring of input events.
///
/// `head` is the next slot written, `tail` the next slot read. When full, a
/// push overwrites the oldest unread event.
#[derive(Debug, Clone)]
pub struct EventQueue {
    slots: Vec<Option<InputEvent>>,
    head: usize,
    tail: usize,
    len: usize,
    dropped: u64,
}

impl EventQueue {
    /// Creates a queue holding up to `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            head: 0,
            tail: 0,
            len: 0,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Events discarded by overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Appends an event. Returns `false` when the oldest event had to be
    /// dropped to make room.
    pub fn push(&mut self, event: InputEvent) -> bool {
        let overflowed = self.len == self.capacity();
        if overflowed {
            self.tail = self.advance(self.tail);
            self.len -= 1;
            self.dropped += 1;
        }
        self.slots[self.head] = Some(event);
        self.head = self.advance(self.head);
        self.len += 1;
        !overflowed
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        if self.len == 0 {
            return None;
        }
        let event = self.slots[self.tail].take();
        self.tail = self.advance(self.tail);
        self.len -= 1;
        event
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }
}
