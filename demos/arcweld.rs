// Copyright 2024 the Arcfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read G-code on stdin and write it to stdout with arcs welded in.

use std::io::{self, BufRead, Write};

use arcfit::gcode::ArcWelder;
use arcfit::ArcFitOptions;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut welder = ArcWelder::new(ArcFitOptions::default());
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut buf = String::new();
    for line in io::stdin().lock().lines() {
        welder.process_line(&line?, &mut buf)?;
        out.write_all(buf.as_bytes())?;
        buf.clear();
    }
    welder.finish(&mut buf)?;
    out.write_all(buf.as_bytes())?;
    out.flush()?;
    Ok(())
}
