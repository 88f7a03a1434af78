use std::cmp::Ordering;
use thiserror::Error;

const FIRST_ELEMENT_INDEX: usize = 1;

/// Indexed binary min-heap keyed by dense ids, with in-place priority updates.
///
/// The position table grows with the largest id pushed so far.
pub struct PriorityQueue<P>
where
    P: PartialOrd,
{
    heap: Vec<(usize, P)>,
    positions: Vec<Option<usize>>,
    size: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PriorityQueueError {
    #[error("Element already exists in the priority queue")]
    ElementAlreadyExists,
}

impl<P> PriorityQueue<P>
where
    P: PartialOrd + Copy + Default,
{
    pub fn new(capacity: usize) -> Self {
        let mut heap = Vec::with_capacity(capacity + 1);
        heap.push((usize::MAX, P::default()));
        Self {
            heap,
            positions: Vec::with_capacity(capacity),
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, id: usize) -> bool {
        matches!(self.positions.get(id), Some(Some(_)))
    }

    pub fn push(&mut self, id: usize, priority: P) -> Result<usize, PriorityQueueError> {
        if self.contains(id) {
            return Err(PriorityQueueError::ElementAlreadyExists);
        }

        self.insert(id, priority);

        Ok(id)
    }

    /// Inserts `id`, or moves it to `priority` when it is already queued.
    pub fn push_or_update(&mut self, id: usize, priority: P) {
        if self.contains(id) {
            self.update_priority(id, priority);
        } else {
            self.insert(id, priority);
        }
    }

    pub fn peek(&self) -> Option<&(usize, P)> {
        self.heap.get(FIRST_ELEMENT_INDEX)
    }

    pub fn pop(&mut self) -> Option<(usize, P)> {
        if self.size == 0 {
            return None;
        }

        let (id, priority) = self.heap.swap_remove(FIRST_ELEMENT_INDEX);
        self.size -= 1;

        self.positions[id] = None;

        if self.size > 0 {
            // The last becomes the first element
            self.positions[self.heap[FIRST_ELEMENT_INDEX].0] = Some(FIRST_ELEMENT_INDEX);
            self.sift_down(FIRST_ELEMENT_INDEX);
        }

        Some((id, priority))
    }

    pub fn update_priority(&mut self, id: usize, priority: P) {
        if let Some(Some(position)) = self.positions.get(id).copied() {
            let current_priority = self.heap[position].1;
            self.heap[position] = (id, priority);

            match priority.partial_cmp(&current_priority) {
                Some(Ordering::Greater) => self.sift_down(position),
                Some(Ordering::Less) => self.sift_up(position),
                _ => {}
            }
        }
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.heap.truncate(FIRST_ELEMENT_INDEX);
        self.size = 0;
    }

    fn insert(&mut self, id: usize, priority: P) {
        if id >= self.positions.len() {
            self.positions.resize(id + 1, None);
        }

        self.size += 1;
        self.heap.push((id, priority));
        self.positions[id] = Some(self.size);
        self.sift_up(self.size);
    }

    fn sift_up(&mut self, element_index: usize) {
        if element_index == FIRST_ELEMENT_INDEX {
            self.positions[self.heap[element_index].0] = Some(element_index);
            return;
        }

        let mut index = element_index;
        let priority = self.heap[index].1;
        while index >> 1 > 0 && priority < self.heap[index >> 1].1 {
            let parent_index = index >> 1;
            self.heap.swap(index, parent_index);

            // The position of the previous parent is updated
            self.positions[self.heap[index].0] = Some(index);

            index = parent_index;
        }

        self.positions[self.heap[index].0] = Some(index);
    }

    fn sift_down(&mut self, element_index: usize) {
        if self.size == 0 {
            return;
        }

        let mut index = element_index;
        let priority = self.heap[index].1;

        while index << 1 <= self.size {
            let left_child_index = index << 1;
            let right_child_index = left_child_index + 1;

            let mut child_index = left_child_index;
            if right_child_index <= self.size
                && self.heap[right_child_index].1 < self.heap[left_child_index].1
            {
                child_index = right_child_index;
            }

            if priority <= self.heap[child_index].1 {
                break;
            }

            self.heap.swap(index, child_index);

            // The position of the previous child is updated
            self.positions[self.heap[index].0] = Some(index);

            index = child_index;
        }

        self.positions[self.heap[index].0] = Some(index);
    }
}
