//! A fixed set of programs, selectable by index.

use crate::program::Program;
use crate::serializer::{parse_lines, LINE_END};
use std::ops::{Index, IndexMut};

pub const NUMBER_OF_PROGRAMS: usize = 128;

const LAST_PROGRAM_INDEX: usize = NUMBER_OF_PROGRAMS - 1;

/// `(name, serialized)` of the programs a fresh bank starts with.
const BUILT_IN_PROGRAMS: &[(&str, &str)] = &[("Default", "[mpeemulator]\n")];

/// 128 programs plus the index of the selected one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bank {
    programs: Vec<Program>,
    current_program_index: usize,
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

impl Bank {
    pub fn new() -> Self {
        let programs = (0..NUMBER_OF_PROGRAMS)
            .map(|index| match BUILT_IN_PROGRAMS.get(index) {
                Some((name, serialized)) => Program::new(name, &default_name(index), serialized),
                None => blank_program(index),
            })
            .collect();

        Self {
            programs,
            current_program_index: 0,
        }
    }

    /// Maps a normalized host parameter onto a program index.
    pub fn normalized_parameter_value_to_program_index(value: f64) -> usize {
        (value * LAST_PROGRAM_INDEX as f64)
            .round()
            .clamp(0.0, LAST_PROGRAM_INDEX as f64) as usize
    }

    pub fn program_index_to_normalized_parameter_value(index: usize) -> f64 {
        (index as f64 / LAST_PROGRAM_INDEX as f64).min(1.0)
    }

    pub fn current_program_index(&self) -> usize {
        self.current_program_index
    }

    pub fn set_current_program_index(&mut self, index: usize) {
        self.current_program_index = index.min(LAST_PROGRAM_INDEX);
    }

    pub fn current_program(&self) -> &Program {
        &self.programs[self.current_program_index]
    }

    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter()
    }

    /// Loads successive `[mpeemulator]` sections into programs `0..`, and
    /// blanks the programs left over.
    pub fn import(&mut self, serialized_bank: &str) {
        self.import_programs(serialized_bank, false);
    }

    /// Like [`import`](Self::import), keeping only the program names.
    pub fn import_names(&mut self, serialized_bank: &str) {
        self.import_programs(serialized_bank, true);
    }

    fn import_programs(&mut self, serialized_bank: &str, names_only: bool) {
        let lines = parse_lines(serialized_bank);
        let mut lines = lines.into_iter().peekable();
        let mut imported = 0;

        while imported < NUMBER_OF_PROGRAMS && lines.peek().is_some() {
            self.programs[imported].import_lines(&mut lines, names_only);
            imported += 1;
        }

        for index in imported..NUMBER_OF_PROGRAMS {
            self.programs[index] = blank_program(index);
        }

        tracing::debug!(imported, names_only, "bank imported");
    }

    /// Every program's section followed by an empty line.
    pub fn serialize(&self) -> String {
        let mut serialized = String::with_capacity(NUMBER_OF_PROGRAMS * 64);
        for program in &self.programs {
            serialized.push_str(program.serialize());
            serialized.push_str(LINE_END);
        }
        serialized
    }
}

impl Index<usize> for Bank {
    type Output = Program;

    fn index(&self, index: usize) -> &Program {
        &self.programs[index]
    }
}

impl IndexMut<usize> for Bank {
    fn index_mut(&mut self, index: usize) -> &mut Program {
        &mut self.programs[index]
    }
}

/// `Prog001` for index 0.
fn default_name(index: usize) -> String {
    format!("Prog{:03}", index + 1)
}

fn blank_program(index: usize) -> Program {
    Program::new("", &default_name(index), "")
}
