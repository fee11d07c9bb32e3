//! `cmin symbols` command implementation.
//!
//! Prints the short names the allocator hands out, in order.

use cmin_mangle::{MangleOptions, SymbolAllocator};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct SymbolJson {
    index: usize,
    name: String,
}

#[derive(Serialize)]
struct SymbolsResultJson {
    ok: bool,
    start: usize,
    /// Index to continue from after the last name.
    next: usize,
    symbols: Vec<SymbolJson>,
}

/// Allocate `count` names starting at `start`.
fn sequence(allocator: &SymbolAllocator, start: usize, count: usize) -> (Vec<SymbolJson>, usize) {
    let mut symbols = Vec::with_capacity(count);
    let mut index = start;
    for _ in 0..count {
        let (next, name) = allocator.allocate(index);
        symbols.push(SymbolJson {
            index: next - 1,
            name,
        });
        index = next;
    }
    (symbols, index)
}

/// Run the symbols command.
pub fn run(start: usize, count: usize, reserve: &[String], json: bool) -> Result<()> {
    let allocator = MangleOptions::default()
        .with_reserved(reserve.iter().cloned())
        .allocator();
    let (symbols, next) = sequence(&allocator, start, count);

    if json {
        let result = SymbolsResultJson {
            ok: true,
            start,
            next,
            symbols,
        };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else {
        for symbol in &symbols {
            println!("{:>8}  {}", symbol.index, symbol.name);
        }
    }
    Ok(())
}
