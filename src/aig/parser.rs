//! Reader for the ASCII AIGER subset (`aag`, combinational only).
//!
//! Any malformed record aborts the load: no partial circuit is ever
//! returned, and the error identifies the offending line and field.

use std::{fs::File, io::BufReader, io::Read, path::Path};

use rustc_hash::FxHashMap;

use crate::{Aig, GateEdge, GateId, Result, aig::error::ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    max_var: u64,
    inputs: u64,
    latches: u64,
    outputs: u64,
    ands: u64,
}

fn read_number(token: &str, field: &'static str, line: u32) -> std::result::Result<u64, ParseError> {
    token.parse::<u64>().map_err(|_| ParseError::BadNumber {
        line,
        field,
        found: token.to_string(),
    })
}

fn parse_header(text: &str, line: u32) -> std::result::Result<Header, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.first() != Some(&"aag") {
        return Err(ParseError::BadHeader {
            line,
            found: text.trim().to_string(),
        });
    }
    const FIELDS: [&str; 5] = [
        "number of variables",
        "number of inputs",
        "number of latches",
        "number of outputs",
        "number of and gates",
    ];
    if tokens.len() < 6 {
        return Err(ParseError::MissingField {
            line,
            field: FIELDS[tokens.len() - 1],
        });
    }
    if tokens.len() > 6 {
        return Err(ParseError::BadHeader {
            line,
            found: text.trim().to_string(),
        });
    }
    let mut fields = [0u64; 5];
    for (i, f) in fields.iter_mut().enumerate() {
        *f = read_number(tokens[i + 1], FIELDS[i], line)?;
    }
    let header = Header {
        max_var: fields[0],
        inputs: fields[1],
        latches: fields[2],
        outputs: fields[3],
        ands: fields[4],
    };
    if header.latches != 0 {
        return Err(ParseError::LatchesUnsupported { line });
    }
    if header.max_var < header.inputs + header.ands {
        return Err(ParseError::TooFewVariables {
            line,
            max_var: header.max_var,
        });
    }
    Ok(header)
}

/// One token per line, rejecting trailing garbage.
fn parse_record(
    text: &str,
    count: usize,
    field: &'static str,
    line: u32,
) -> std::result::Result<Vec<u64>, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < count {
        return Err(ParseError::MissingField { line, field });
    }
    if tokens.len() > count {
        return Err(ParseError::BadNumber {
            line,
            field,
            found: tokens[count].to_string(),
        });
    }
    tokens
        .iter()
        .map(|t| read_number(t, field, line))
        .collect()
}

fn check_in_range(literal: u64, max_var: u64, line: u32) -> std::result::Result<(), ParseError> {
    if literal >> 1 > max_var {
        return Err(ParseError::LiteralOutOfRange { line, literal });
    }
    Ok(())
}

fn check_even(literal: u64, line: u32) -> std::result::Result<(), ParseError> {
    if literal & 1 == 1 {
        return Err(ParseError::OddLiteral { line, literal });
    }
    Ok(())
}

/// A line cursor keeping track of the current line number for diagnostics.
struct Cursor<'a> {
    inner: std::str::Lines<'a>,
    line_no: u32,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor {
            inner: text.lines(),
            line_no: 0,
        }
    }

    fn next(&mut self, field: &'static str) -> std::result::Result<(&'a str, u32), ParseError> {
        self.line_no += 1;
        match self.inner.next() {
            Some(text) => Ok((text, self.line_no)),
            None => Err(ParseError::MissingField {
                line: self.line_no,
                field,
            }),
        }
    }

    fn next_opt(&mut self) -> Option<(&'a str, u32)> {
        self.line_no += 1;
        self.inner.next().map(|text| (text, self.line_no))
    }
}

struct Definitions {
    seen: FxHashMap<GateId, (&'static str, u32)>,
}

impl Definitions {
    fn new() -> Self {
        let mut seen = FxHashMap::default();
        seen.insert(0, ("CONST", 0));
        Definitions { seen }
    }

    fn define(
        &mut self,
        var: GateId,
        kind: &'static str,
        line: u32,
    ) -> std::result::Result<(), ParseError> {
        if let Some(&(prev_kind, prev_line)) = self.seen.get(&var) {
            return Err(ParseError::Redefined {
                line,
                literal: 2 * var,
                prev_kind,
                prev_line,
            });
        }
        self.seen.insert(var, (kind, line));
        Ok(())
    }
}

impl Aig {
    /// Creates an AIG from an open `.aag` stream.
    pub fn from_ascii(reader: impl Read) -> Result<Self> {
        let mut text = String::new();
        let mut reader = BufReader::new(reader);
        reader
            .read_to_string(&mut text)
            .map_err(|e| ParseError::Io(e.to_string()))?;
        Aig::from_str_ascii(&text)
    }

    /// Creates an AIG from the full text of an `.aag` file.
    pub fn from_str_ascii(text: &str) -> Result<Self> {
        let mut cursor = Cursor::new(text);

        let (header_text, header_line) = cursor.next("header")?;
        let header = parse_header(header_text, header_line)?;
        let mut defs = Definitions::new();

        // Collect all three sections before building anything, so a late
        // error cannot leave a half-built circuit behind.
        let mut input_records: Vec<(GateId, u32)> = Vec::new();
        for _ in 0..header.inputs {
            let (text, line) = cursor.next("input definition")?;
            let literal = parse_record(text, 1, "input literal", line)?[0];
            check_even(literal, line)?;
            check_in_range(literal, header.max_var, line)?;
            defs.define(literal >> 1, "PI", line)?;
            input_records.push((literal >> 1, line));
        }

        let mut output_records: Vec<(u64, u32)> = Vec::new();
        for _ in 0..header.outputs {
            let (text, line) = cursor.next("output definition")?;
            let literal = parse_record(text, 1, "output literal", line)?[0];
            check_in_range(literal, header.max_var, line)?;
            output_records.push((literal, line));
        }

        let mut and_records: Vec<([u64; 3], u32)> = Vec::new();
        for _ in 0..header.ands {
            let (text, line) = cursor.next("and gate definition")?;
            let record = parse_record(text, 3, "and gate literal", line)?;
            check_even(record[0], line)?;
            for &literal in record.iter() {
                check_in_range(literal, header.max_var, line)?;
            }
            defs.define(record[0] >> 1, "AIG", line)?;
            and_records.push(([record[0], record[1], record[2]], line));
        }

        // Build phase. And gates are created with dummy operand edges first
        // so forward references within the and section resolve, then wired
        // for real; anything still undefined becomes a placeholder.
        let mut aig = Aig::new();
        aig.max_var = header.max_var;
        for &(var, line) in &input_records {
            aig.add_input(var, line)?;
        }
        for &([lhs, _, _], line) in &and_records {
            aig.add_and(
                lhs >> 1,
                GateEdge::new(0, false),
                GateEdge::new(0, false),
                line,
            )?;
        }
        for &([lhs, rhs0, rhs1], _) in &and_records {
            for (index, rhs) in [rhs0, rhs1].into_iter().enumerate() {
                let edge = GateEdge::from_literal(rhs);
                if !aig.is_live(edge.gate) {
                    aig.add_undef(edge.gate)?;
                }
                aig.set_fanin(lhs >> 1, index, edge)?;
            }
        }
        for &(literal, line) in &output_records {
            let edge = GateEdge::from_literal(literal);
            if !aig.is_live(edge.gate) {
                aig.add_undef(edge.gate)?;
            }
            aig.add_output(edge, line)?;
        }

        // Optional symbol section, then the free-text comment section.
        while let Some((text, line)) = cursor.next_opt() {
            if text.trim().is_empty() {
                continue;
            }
            if text.starts_with('c') {
                break;
            }
            parse_symbol(&mut aig, text, line)?;
        }

        aig.rebuild_order();
        aig.check_integrity()?;
        Ok(aig)
    }

    /// Creates an AIG from an `.aag` file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref()).map_err(|e| ParseError::Io(e.to_string()))?;
        Aig::from_ascii(f)
    }
}

fn parse_symbol(aig: &mut Aig, text: &str, line: u32) -> std::result::Result<(), ParseError> {
    let bad = || ParseError::BadSymbol {
        line,
        found: text.to_string(),
    };
    let kind = text.chars().next().ok_or_else(bad)?;
    if kind != 'i' && kind != 'o' {
        return Err(bad());
    }
    let (index, name) = text[1..].split_once(' ').ok_or_else(bad)?;
    let index: usize = index.parse().map_err(|_| bad())?;
    if name.is_empty() {
        return Err(bad());
    }
    let id = match kind {
        'i' => *aig.inputs.get(index).ok_or_else(bad)?,
        _ => *aig.outputs.get(index).ok_or_else(bad)?,
    };
    if aig.gate(id).symbol.is_some() {
        return Err(bad());
    }
    aig.gate_mut(id).symbol = Some(name.to_string());
    aig.symbol_lines.push(text.to_string());
    Ok(())
}
