use std::borrow::Cow;

const COLUMN_GAP: &str = "  ";

#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Pads every column to its widest cell. Trailing spaces are trimmed.
    pub fn build(self) -> String {
        let column_count = self
            .rows
            .iter()
            .map(|row| row.as_ref().len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut all_rows: Vec<&[Cow<'a, str>]> = Vec::with_capacity(self.rows.len() + 1);
        all_rows.push(self.headers);
        all_rows.extend(self.rows.iter().map(|row| row.as_ref()));

        let mut widths = vec![0usize; column_count];
        for row in &all_rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for row in all_rows.into_iter().filter(|row| !row.is_empty()) {
            let mut line = String::new();
            for (idx, width) in widths.iter().enumerate() {
                if idx > 0 {
                    line.push_str(COLUMN_GAP);
                }
                let cell: &str = row.get(idx).map_or("", |cell| &**cell);
                let padding = " ".repeat(width - cell.chars().count());
                match self.alignments.get(idx).copied().unwrap_or_default() {
                    Alignment::Left => {
                        line.push_str(cell);
                        line.push_str(&padding);
                    }
                    Alignment::Right => {
                        line.push_str(&padding);
                        line.push_str(cell);
                    }
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
