use common::entities::CardId;

//The stack of spells and abilities waiting to resolve.
//The last entry is the top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stack {
    entries: Vec<CardId>,
}

impl Stack {
    pub fn push(&mut self, entry: CardId) {
        self.entries.push(entry);
    }
    pub fn pop(&mut self) -> Option<CardId> {
        self.entries.pop()
    }
    pub fn peek(&self) -> Option<CardId> {
        self.entries.last().copied()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn contains(&self, entry: CardId) -> bool {
        self.entries.contains(&entry)
    }
    //Bottom to top
    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.entries.iter().copied()
    }
    //Takes an entry out of the middle of the stack, for countering it
    pub fn remove(&mut self, entry: CardId) -> bool {
        let len = self.entries.len();
        self.entries.retain(|&x| x != entry);
        self.entries.len() != len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::entities::MIN_CARDID;
    use std::num::NonZeroU64;

    fn id(n: u64) -> CardId {
        CardId::from(NonZeroU64::new(MIN_CARDID + n).unwrap())
    }

    #[test]
    fn last_in_first_out() {
        let mut stack = Stack::default();
        for n in 1..=3 {
            stack.push(id(n));
        }
        assert_eq!(stack.peek(), Some(id(3)));
        assert_eq!(stack.pop(), Some(id(3)));
        assert_eq!(stack.pop(), Some(id(2)));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop(), Some(id(1)));
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn removing_from_the_middle_keeps_order() {
        let mut stack = Stack::default();
        for n in 1..=3 {
            stack.push(id(n));
        }
        assert!(stack.remove(id(2)));
        assert!(!stack.remove(id(2)));
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![id(1), id(3)]);
    }
}
