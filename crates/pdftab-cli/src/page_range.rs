/// Parse a page selection like "1,3-5" into sorted, 0-indexed page numbers.
///
/// Input is 1-indexed. Page 0, reversed ranges and pages past the end of the
/// document are rejected.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, String> {
    let mut pages = Vec::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_page(start, page_count)?;
                let end = parse_page(end, page_count)?;
                if start > end {
                    return Err(format!("reversed page range: '{part}'"));
                }
                pages.extend(start..=end);
            }
            None => pages.push(parse_page(part, page_count)?),
        }
    }

    if pages.is_empty() {
        return Err(format!("no pages selected by '{input}'"));
    }
    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

/// One 1-indexed page number, returned 0-indexed.
fn parse_page(text: &str, page_count: usize) -> Result<usize, String> {
    let text = text.trim();
    let page: usize = text
        .parse()
        .map_err(|_| format!("invalid page number: '{text}'"))?;
    match page {
        0 => Err("page 0 is invalid (pages start at 1)".to_string()),
        p if p > page_count => Err(format!(
            "page {p} exceeds document page count ({page_count})"
        )),
        p => Ok(p - 1),
    }
}
