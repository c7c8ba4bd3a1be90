use std::fmt;

pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct DisplayFn<F> {
        f: F,
    }
    impl<F> fmt::Display for DisplayFn<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.f)(formatter)
        }
    }
    DisplayFn { f }
}

/// Write rows of cells as a left-aligned text grid.
///
/// Each column is as wide as its widest cell; columns are separated by two spaces
/// and trailing whitespace is trimmed.
pub fn write_grid(f: &mut fmt::Formatter<'_>, rows: &[Vec<String>]) -> fmt::Result {
    let num_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; num_columns];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            let padding = widths[i] - cell.chars().count();
            line.extend(std::iter::repeat(' ').take(padding));
        }
        writeln!(f, "{}", line.trim_end())?;
    }
    Ok(())
}
