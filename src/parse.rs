use scraper::{Html, Selector};
use url::Url;

use crate::config::join_url;
use crate::{
    info_time, warn_time, Error, Result, CATEGORY_MARKER, DOWNLOAD_LABEL, FILE_EXTENSION,
    SPECIES_SELECT_ID,
};

/// A species entry from the index dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub url: Url,
}

/// Parses the index page, extracting the species dropdown.
/// Returns one [`Category`] per distinct species name, in the order they first appear.
/// Options without a value or not pointing at a best-of page are dropped.
pub fn parse_categories(html: &str, base: &Url) -> Result<Vec<Category>> {
    info_time!("Parsing category links...");
    let doc = Html::parse_document(html);

    let select_selector = create_selector(&format!(r#"select[id="{SPECIES_SELECT_ID}"]"#))?;
    let option_selector = create_selector("option")?;

    let mut categories: Vec<Category> = Vec::new();
    if let Some(select) = doc.select(&select_selector).next() {
        for option in select.select(&option_selector) {
            let value = match option.value().attr("value") {
                Some(v) if !v.is_empty() && v.contains(CATEGORY_MARKER) => v,
                _ => continue,
            };
            let name = option.text().collect::<String>().trim().to_string();
            let url = match join_url(base, value) {
                Ok(url) => url,
                Err(e) => {
                    warn_time!("Skipping unresolvable category {}: {}", name, e);
                    continue;
                }
            };

            // Same name twice: the later option wins but keeps the first position.
            match categories.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.url = url,
                None => categories.push(Category { name, url }),
            }
        }
    }

    info_time!("Found {} species categories.", categories.len());
    Ok(categories)
}

/// Parses a best-of page and returns the absolute URLs of every `.wav` file linked
/// from an anchor whose text is exactly "Download", in document order.
pub fn parse_download_links(html: &str, base: &Url, category_name: &str) -> Result<Vec<Url>> {
    info_time!("  Parsing download links for {}...", category_name);
    let doc = Html::parse_document(html);
    let anchor_selector = create_selector("a[href]")?;

    let mut links = Vec::new();
    for anchor in doc.select(&anchor_selector) {
        if anchor.text().collect::<String>() != DOWNLOAD_LABEL {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = match join_url(base, href) {
            Ok(url) => url,
            Err(e) => {
                warn_time!("  Skipping unresolvable link {}: {}", href, e);
                continue;
            }
        };
        if url.path().ends_with(FILE_EXTENSION) {
            links.push(url);
        }
    }

    info_time!("  Found {} sound files for {}.", links.len(), category_name);
    Ok(links)
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://whoicf2.whoi.edu/science/B/whalesounds/").unwrap()
    }

    #[test]
    fn keeps_only_best_of_options() {
        let html = r#"
            <html><body>
            <select id="getSpeciesCommon">
                <option value="">Choose a species</option>
                <option value="bestOf.cfm?code=BW">  Blue Whale </option>
                <option value="other.cfm?code=OR">Orca</option>
            </select>
            </body></html>"#;

        let categories = parse_categories(html, &base()).unwrap();
        assert_eq!(
            categories,
            vec![Category {
                name: "Blue Whale".into(),
                url: Url::parse(
                    "https://whoicf2.whoi.edu/science/B/whalesounds/bestOf.cfm?code=BW"
                )
                .unwrap(),
            }]
        );
    }

    #[test]
    fn ignores_other_selects_and_options_without_value() {
        let html = r#"
            <select id="getSpeciesLatin">
                <option value="bestOf.cfm?code=BB1A">Balaena mysticetus</option>
            </select>
            <select id="getSpeciesCommon">
                <option>Bowhead Whale</option>
                <option value="bestOf.cfm?code=BB1A">Bowhead Whale</option>
                <option value="bestOf.cfm?code=CC2A">Sperm Whale</option>
            </select>"#;

        let names: Vec<_> = parse_categories(html, &base())
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Bowhead Whale", "Sperm Whale"]);
    }

    #[test]
    fn duplicate_names_keep_first_position_and_last_url() {
        let html = r#"
            <select id="getSpeciesCommon">
                <option value="bestOf.cfm?code=AA1">Killer Whale</option>
                <option value="bestOf.cfm?code=BB2">Narwhal</option>
                <option value="bestOf.cfm?code=AA9">Killer Whale</option>
            </select>"#;

        let categories = parse_categories(html, &base()).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Killer Whale");
        assert!(categories[0].url.as_str().ends_with("code=AA9"));
        assert_eq!(categories[1].name, "Narwhal");
    }

    #[test]
    fn missing_dropdown_yields_nothing() {
        let categories = parse_categories("<html><body><p>maintenance</p></body></html>", &base());
        assert!(categories.unwrap().is_empty());
    }

    #[test]
    fn only_wav_download_anchors_are_kept() {
        let html = r#"
            <table>
                <tr><td><a href="sounds/bw01.wav">Download</a></td></tr>
                <tr><td><a href="sounds/bw01.txt">Download</a></td></tr>
            </table>"#;

        let links = parse_download_links(html, &base(), "Blue Whale").unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].as_str(),
            "https://whoicf2.whoi.edu/science/B/whalesounds/sounds/bw01.wav"
        );
    }

    #[test]
    fn label_must_match_exactly() {
        let html = r#"
            <a href="sounds/a.wav">Download</a>
            <a href="sounds/b.wav">Listen</a>
            <a href="sounds/c.wav">Download all</a>
            <a href="sounds/d.wav">download</a>
            <a href="/abs/e.wav">Download</a>
            <a href="https://cdn.example.org/f.wav">Download</a>"#;

        let links: Vec<_> = parse_download_links(html, &base(), "Test")
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            [
                "https://whoicf2.whoi.edu/science/B/whalesounds/sounds/a.wav",
                "https://whoicf2.whoi.edu/abs/e.wav",
                "https://cdn.example.org/f.wav",
            ]
        );
    }

    #[test]
    fn page_without_links_is_empty_not_an_error() {
        let links = parse_download_links("<p>No cuts yet</p>", &base(), "Rare Whale").unwrap();
        assert!(links.is_empty());
    }
}
