//! Decimal encodings of Comcigan grid cells.
//!
//! Class grid cell: `teacher * 100 + subject`, e.g. `503` is teacher 5 teaching
//! subject 3.
//!
//! Teacher grid cell: `(grade * 100 + room) * 100 + subject`, e.g. `30712` is
//! grade 3, room 7, subject 12.
//!
//! In both grids a value of 100 or less means there is no class in that period.

pub const NO_CLASS_MAX: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCell {
    pub teacher: usize,
    pub subject: usize,
}

impl ClassCell {
    pub fn decode(value: u32) -> Option<Self> {
        (value > NO_CLASS_MAX).then(|| Self {
            teacher: (value / 100) as usize,
            subject: (value % 100) as usize,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeacherCell {
    pub grade: u32,
    pub room: u32,
    pub subject: usize,
}

impl TeacherCell {
    pub fn decode(value: u32) -> Option<Self> {
        (value > NO_CLASS_MAX).then(|| {
            let class = value / 100;
            Self {
                grade: class / 100,
                room: class % 100,
                subject: (value % 100) as usize,
            }
        })
    }

    pub fn encode(&self) -> u32 {
        self.grade * 10000 + self.room * 100 + self.subject as u32
    }
}

/// Subject part of any cell value.
pub fn subject_of(value: u32) -> usize {
    (value % 100) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_cell_splits_teacher_and_subject() {
        assert_eq!(
            ClassCell::decode(503),
            Some(ClassCell {
                teacher: 5,
                subject: 3
            })
        );
    }

    #[test]
    fn small_values_are_empty_periods() {
        assert_eq!(ClassCell::decode(0), None);
        assert_eq!(ClassCell::decode(100), None);
        assert_eq!(TeacherCell::decode(42), None);
    }

    #[test]
    fn teacher_cell_splits_grade_room_and_subject() {
        let cell = TeacherCell::decode(30712).unwrap();
        assert_eq!((cell.grade, cell.room, cell.subject), (3, 7, 12));
        assert_eq!(cell.encode(), 30712);
    }
}
