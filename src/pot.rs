//! Parsing of `hash:cleartext` lines as printed by the cracking tool's show
//! form (and stored in its potfiles).

#[derive(Debug, thiserror::Error)]
pub enum PotError {
	#[error("malformed result line: {0}")]
	MalformedLine(String),
}

pub fn parse_pot_line(line: &str) -> Result<(String, String), PotError> {
	// hash:cleartext, only the first ':' splits; cleartext is kept verbatim
	if let Some((hash, clear)) = line.split_once(':') {
		Ok((hash.to_string(), clear.to_string()))
	} else {
		Err(PotError::MalformedLine(line.to_string()))
	}
}

/// Parse show output into ordered `(hash, cleartext)` pairs. Empty and
/// colon-less lines are skipped; cleartext whitespace is preserved.
pub fn parse_show_output(stdout: &str) -> Vec<(String, String)> {
	let mut pairs = Vec::new();
	for line in stdout.lines() {
		let line = line.strip_suffix('\r').unwrap_or(line);
		if line.is_empty() {
			continue;
		}
		match parse_pot_line(line) {
			Ok(pair) => pairs.push(pair),
			Err(e) => log::debug!("{}", e),
		}
	}
	pairs
}
