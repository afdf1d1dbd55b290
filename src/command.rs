//! Game commands and the bounded queue that hands them to the game loop

/// Number of commands the queue can hold
pub const COMMAND_QUEUE_CAPACITY: usize = 8;

/// Actions the game loop can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    /// Move down one row, locking the piece if it cannot fall
    SoftDrop,
    /// Drop until the piece locks
    HardDrop,
}

impl Command {
    pub fn is_drop(&self) -> bool {
        matches!(self, Command::SoftDrop | Command::HardDrop)
    }
}

/// Fixed-capacity FIFO ring of pending commands.
///
/// Enqueueing on a full queue drops the new command and leaves the queued
/// ones untouched.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    slots: [Command; COMMAND_QUEUE_CAPACITY],
    start: usize,
    fill: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            slots: [Command::SoftDrop; COMMAND_QUEUE_CAPACITY],
            start: 0,
            fill: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.fill
    }

    pub fn is_empty(&self) -> bool {
        self.fill == 0
    }

    pub fn is_full(&self) -> bool {
        self.fill >= COMMAND_QUEUE_CAPACITY
    }

    /// Append a command. Returns false (and drops it) when full.
    pub fn push(&mut self, command: Command) -> bool {
        if self.is_full() {
            tracing::trace!(?command, "command queue full, dropping");
            return false;
        }
        let slot = (self.start + self.fill) % COMMAND_QUEUE_CAPACITY;
        self.slots[slot] = command;
        self.fill += 1;
        true
    }

    /// Remove and return the oldest command
    pub fn pop(&mut self) -> Option<Command> {
        if self.is_empty() {
            return None;
        }
        let command = self.slots[self.start];
        self.start = (self.start + 1) % COMMAND_QUEUE_CAPACITY;
        self.fill -= 1;
        Some(command)
    }

    /// Iterate over pending commands, oldest first
    pub fn iter(&self) -> impl Iterator<Item = Command> + '_ {
        (0..self.fill).map(|i| self.slots[(self.start + i) % COMMAND_QUEUE_CAPACITY])
    }

    /// Whether a soft or hard drop is already pending
    pub fn has_pending_drop(&self) -> bool {
        self.iter().any(|command| command.is_drop())
    }

    pub fn clear(&mut self) {
        self.start = 0;
        self.fill = 0;
    }
}
