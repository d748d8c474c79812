//! Growable ring buffer holding the players waiting for a seat at the table.

use crate::state::game::PlayerId;

/// Capacity used when a queue is created without an explicit hint.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// FIFO queue of waiting players backed by a circular buffer.
///
/// The buffer doubles when full and compacts on arbitrary removal, so the
/// logical order observed through [`WaitingQueue::snapshot`] is always the
/// order implied by the sequence of enqueue/dequeue/remove calls. The queue
/// does not enforce identifier uniqueness; callers do.
#[derive(Debug, Clone)]
pub struct WaitingQueue {
    slots: Vec<Option<PlayerId>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl WaitingQueue {
    /// Create an empty queue able to hold `capacity` players before growing.
    ///
    /// A zero capacity is bumped to one so the modulo arithmetic stays valid.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Build a queue from players already in FIFO order.
    pub fn from_players<I>(players: I, min_capacity: usize) -> Self
    where
        I: IntoIterator<Item = PlayerId>,
    {
        let players = players.into_iter().collect::<Vec<_>>();
        let mut queue = Self::with_capacity(min_capacity.max(players.len()));
        for player in players {
            queue.enqueue(player);
        }
        queue
    }

    /// Number of waiting players.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Append a player at the logical tail, doubling the buffer when full.
    pub fn enqueue(&mut self, player: PlayerId) {
        if self.len == self.capacity() {
            self.grow();
        }
        self.slots[self.tail] = Some(player);
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;
    }

    /// Remove and return the logical head, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<PlayerId> {
        if self.len == 0 {
            return None;
        }
        let player = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        player
    }

    /// Remove the first occurrence of `player`, keeping the others in order.
    ///
    /// Every element behind the removed one shifts one slot towards the head
    /// so the buffer never contains holes between `head` and `tail`.
    pub fn remove_value(&mut self, player: &str) -> bool {
        let Some(offset) = self.iter().position(|candidate| candidate == player) else {
            return false;
        };

        let capacity = self.capacity();
        for index in offset..self.len - 1 {
            let from = (self.head + index + 1) % capacity;
            let to = (self.head + index) % capacity;
            self.slots[to] = self.slots[from].take();
        }

        self.tail = (self.tail + capacity - 1) % capacity;
        self.slots[self.tail] = None;
        self.len -= 1;
        true
    }

    /// True when `player` is waiting.
    pub fn contains(&self, player: &str) -> bool {
        self.iter().any(|candidate| candidate == player)
    }

    /// Copy of the waiting players in FIFO order.
    pub fn snapshot(&self) -> Vec<PlayerId> {
        self.iter().cloned().collect()
    }

    /// Iterate over the waiting players in FIFO order without copying.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerId> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |index| self.slots[(self.head + index) % capacity].as_ref())
    }

    fn grow(&mut self) {
        let capacity = (self.capacity() * 2).max(1);
        let mut slots = vec![None; capacity];
        let old_capacity = self.capacity();
        for (index, slot) in slots.iter_mut().enumerate().take(self.len) {
            *slot = self.slots[(self.head + index) % old_capacity].take();
        }
        self.slots = slots;
        self.head = 0;
        self.tail = self.len;
    }
}

impl Default for WaitingQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

/// Two queues are equal when they hold the same players in the same order,
/// regardless of buffer layout.
impl PartialEq for WaitingQueue {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for WaitingQueue {}
