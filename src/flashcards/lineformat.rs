use std::cmp::max;
use std::io::Write;
use std::iter::repeat;

use crate::errors::Result;
use crate::utils::format_field;

/// one line of `flashcards list`
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub name: String,
    pub question: String,
    pub touched: String,
}

impl Row {
    pub fn write<T: Write>(&self, output: &mut T, line_format: &LineFormat) -> Result<()> {
        let column_seperator: String = repeat(' ').take(line_format.colsep).collect();
        write!(output, "{}", format_field(&self.name, line_format.name_width, true))?;
        write!(output, "{}", column_seperator)?;
        write!(output, "{}", format_field(&self.question, line_format.question_width, true))?;
        if line_format.touched_width != 0 {
            write!(output, "{}", column_seperator)?;
            write!(output, "{}", format_field(&self.touched, line_format.touched_width, false))?;
        }
        writeln!(output)?;
        Ok(())
    }
}

/// Column widths for a list of rows, squeezed to the terminal width.
#[derive(Clone, Debug, PartialEq)]
pub struct LineFormat {
    pub colsep: usize,
    pub name_width: usize,
    pub question_width: usize,
    pub touched_width: usize,
}

impl LineFormat {
    pub fn new(rows: &[Row], condensed: bool, console_width: usize) -> LineFormat {
        let colsep = if condensed { 1 } else { 2 };
        let mut line_format = LineFormat {
            colsep: colsep,
            name_width: rows.iter().map(|r| r.name.chars().count()).fold(4, max),
            question_width: rows.iter().map(|r| r.question.chars().count()).fold(8, max),
            touched_width: if condensed {
                0
            } else {
                rows.iter().map(|r| r.touched.chars().count()).fold(12, max)
            },
        };

        // the question column gives way first
        if console_width > 0 && line_format.line_width() > console_width {
            let others = line_format.line_width() - line_format.question_width;
            line_format.question_width = if console_width > others + 8 {
                console_width - others
            } else {
                8
            };
        }
        line_format
    }

    pub fn line_width(&self) -> usize {
        let seps = if self.touched_width == 0 { 1 } else { 2 };
        self.name_width + self.question_width + self.touched_width + seps * self.colsep
    }
}
