//! Minimal CSV field handling shared by roster loading and attendance logs.
//!
//! Quoted fields may hold commas, doubled quotes and line breaks. Records end
//! at CR, LF or CRLF outside quotes.

pub const RECORD_TERMINATOR: &str = "\r\n";

pub fn quote_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Splits `text` into records. Blank lines are skipped.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let chars: Vec<char> = text.trim_start_matches('\u{feff}').chars().collect();

    let mut finish = |fields: &mut Vec<String>, buf: &mut String, quoted: &mut bool| {
        fields.push(std::mem::take(buf));
        let record = std::mem::take(fields);
        let blank = !*quoted && record.len() == 1 && record[0].trim().is_empty();
        if !blank {
            records.push(record);
        }
        *quoted = false;
    };

    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '"' {
            if in_quotes && i + 1 < chars.len() && chars[i + 1] == '"' {
                buf.push('"');
                i += 2;
                continue;
            }
            in_quotes = !in_quotes;
            quoted = true;
            i += 1;
            continue;
        }
        if in_quotes {
            buf.push(ch);
            i += 1;
            continue;
        }
        match ch {
            ',' => fields.push(std::mem::take(&mut buf)),
            '\r' | '\n' => {
                if ch == '\r' && chars.get(i + 1) == Some(&'\n') {
                    i += 1;
                }
                finish(&mut fields, &mut buf, &mut quoted);
            }
            _ => buf.push(ch),
        }
        i += 1;
    }
    if !buf.is_empty() || !fields.is_empty() || quoted {
        finish(&mut fields, &mut buf, &mut quoted);
    }
    records
}

pub fn format_record<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str(RECORD_TERMINATOR);
    line
}
