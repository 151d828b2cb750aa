//! Normalization of raw openBD records into [`NormalizedBook`]s.
//!
//! Every extraction step falls back to an empty string or a sentinel on
//! missing data. Only a record without any descriptive detail is rejected.

use chrono::{DateTime, Utc};

use crate::models::onix::{CollateralDetail, DescriptiveDetail, PublishingDetail};
use crate::models::{NOT_AVAILABLE, NormalizedBook, RawBibRecord};
use crate::utils::date::format_pubdate;
use crate::utils::isbn::to_isbn10;

const PRIMARY_AUTHOR_ROLE: &str = "A01";
const PAGE_COUNT_TYPES: [&str; 2] = ["00", "11"];
const DESCRIPTION_TYPES: [&str; 2] = ["02", "03"];
const TABLE_OF_CONTENTS_TYPE: &str = "04";
const FRONT_COVER_TYPE: &str = "01";

/// Series name of a record: the first non-empty collection title text.
pub fn series_name(record: &RawBibRecord) -> Option<&str> {
    record
        .descriptive_detail()?
        .collection
        .as_ref()?
        .title_detail
        .as_ref()?
        .first_text()
}

/// Normalize a record.
///
/// `requested_isbn` is the identifier the record was fetched with; it is the
/// fallback when the record carries no product identifier. Returns `None` when
/// the record has no ONIX descriptive detail at all.
pub fn normalize(
    record: &RawBibRecord,
    requested_isbn: Option<&str>,
    discovered_at: DateTime<Utc>,
) -> Option<NormalizedBook> {
    let onix = record.onix.as_ref()?;
    let detail = onix.descriptive_detail.as_ref()?;

    let isbn13 = onix
        .product_identifier
        .as_ref()
        .and_then(|p| p.id_value.as_deref())
        .filter(|s| !s.is_empty())
        .or(requested_isbn.filter(|s| !s.is_empty()))
        .or(record
            .summary
            .as_ref()
            .and_then(|s| s.isbn.as_deref())
            .filter(|s| !s.is_empty()))
        .unwrap_or(NOT_AVAILABLE)
        .to_string();

    let title = detail
        .title_detail
        .as_ref()
        .and_then(|t| t.first_text())
        .unwrap_or(NOT_AVAILABLE)
        .to_string();

    let (author, author_bio) = main_author(detail);
    let (description, table_of_contents) = texts(onix.collateral_detail.as_ref());

    Some(NormalizedBook {
        isbn10: to_isbn10(&isbn13),
        isbn13,
        title,
        author,
        author_bio,
        publisher: publisher(onix.publishing_detail.as_ref()),
        series: series_name(record).unwrap_or_default().to_string(),
        published_date: format_pubdate(record.pubdate().unwrap_or("")),
        page_count: page_count(detail),
        description,
        table_of_contents,
        cover_image_url: cover_image(onix.collateral_detail.as_ref()),
        discovered_at,
    })
}

/// Primary author (role A01, else the first contributor) and their bio.
fn main_author(detail: &DescriptiveDetail) -> (String, String) {
    let chosen = detail
        .contributor
        .iter()
        .find(|c| c.contributor_role.first().map(String::as_str) == Some(PRIMARY_AUTHOR_ROLE))
        .or_else(|| detail.contributor.first());

    match chosen {
        Some(contributor) => (
            contributor
                .person_name
                .as_ref()
                .and_then(|n| n.content.as_deref())
                .filter(|s| !s.is_empty())
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            contributor.biographical_note.clone().unwrap_or_default(),
        ),
        None => (NOT_AVAILABLE.to_string(), String::new()),
    }
}

fn publisher(publishing: Option<&PublishingDetail>) -> String {
    let Some(publishing) = publishing else {
        return NOT_AVAILABLE.to_string();
    };
    publishing
        .imprint
        .as_ref()
        .and_then(|i| i.imprint_name.as_deref())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            publishing
                .publisher
                .first()
                .and_then(|p| p.publisher_name.as_deref())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn page_count(detail: &DescriptiveDetail) -> String {
    detail
        .extent
        .iter()
        .find(|e| {
            e.extent_type
                .as_deref()
                .is_some_and(|t| PAGE_COUNT_TYPES.contains(&t))
        })
        .and_then(|e| e.extent_value.clone())
        .unwrap_or_default()
}

/// Description (last short/long text wins) and table of contents (first wins).
fn texts(collateral: Option<&CollateralDetail>) -> (String, String) {
    let mut description = String::new();
    let mut table_of_contents: Option<String> = None;

    for content in collateral.map(|c| c.text_content.as_slice()).unwrap_or(&[]) {
        let text = content.text.clone().unwrap_or_default();
        match content.text_type.as_deref() {
            Some(t) if DESCRIPTION_TYPES.contains(&t) => description = text,
            Some(TABLE_OF_CONTENTS_TYPE) if table_of_contents.is_none() => {
                table_of_contents = Some(text)
            }
            _ => {}
        }
    }

    (description, table_of_contents.unwrap_or_default())
}

fn cover_image(collateral: Option<&CollateralDetail>) -> String {
    collateral
        .into_iter()
        .flat_map(|c| c.supporting_resource.iter())
        .filter(|r| r.resource_content_type.as_deref() == Some(FRONT_COVER_TYPE))
        .find_map(|r| r.resource_version.first())
        .and_then(|v| v.resource_link.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    use crate::utils::date::UNDETERMINED_RELEASE;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn decode(value: Value) -> RawBibRecord {
        RawBibRecord::decode(value, "test").unwrap()
    }

    fn full_record() -> Value {
        json!({
            "onix": {
                "ProductIdentifier": { "ProductIDType": "15", "IDValue": "9784004310938" },
                "DescriptiveDetail": {
                    "Collection": {
                        "CollectionType": "10",
                        "TitleDetail": {
                            "TitleType": "01",
                            "TitleElement": [
                                { "TitleElementLevel": "03", "TitleText": { "content": "岩波新書 ； 新赤版 1093" } }
                            ]
                        }
                    },
                    "TitleDetail": {
                        "TitleType": "01",
                        "TitleElement": { "TitleElementLevel": "01", "TitleText": { "collationkey": "ニホンゴ", "content": "日本語" } }
                    },
                    "Contributor": [
                        { "SequenceNumber": "1", "ContributorRole": ["B01"], "PersonName": { "content": "編者" } },
                        { "SequenceNumber": "2", "ContributorRole": ["A01"], "PersonName": { "content": "著者 太郎" }, "BiographicalNote": "1950年生まれ" }
                    ],
                    "Extent": [
                        { "ExtentType": "22", "ExtentValue": "1" },
                        { "ExtentType": "11", "ExtentValue": "240", "ExtentUnit": "03" }
                    ]
                },
                "CollateralDetail": {
                    "TextContent": [
                        { "TextType": "02", "Text": "短い紹介" },
                        { "TextType": "04", "Text": "第一章" },
                        { "TextType": "03", "Text": "長い紹介" },
                        { "TextType": "04", "Text": "別の目次" }
                    ],
                    "SupportingResource": [
                        { "ResourceContentType": "02", "ResourceVersion": [ { "ResourceLink": "https://example.com/back.jpg" } ] },
                        { "ResourceContentType": "01", "ResourceVersion": [
                            { "ResourceLink": "https://cover.openbd.jp/9784004310938.jpg" },
                            { "ResourceLink": "https://example.com/second.jpg" }
                        ] }
                    ]
                },
                "PublishingDetail": {
                    "Imprint": { "ImprintName": "岩波書店" },
                    "Publisher": { "PublisherName": "岩波書店（発行）" }
                }
            },
            "summary": { "isbn": "9784004310938", "pubdate": "20071120" },
            "hanmoto": { "datekoukai": "2007-11-01", "datemodified": "2007-11-02 10:00:00" }
        })
    }

    #[test]
    fn extracts_every_field() {
        let book = normalize(&decode(full_record()), Some("9784004310938"), now()).unwrap();

        assert_eq!(book.isbn13, "9784004310938");
        assert_eq!(book.isbn10, "4004310938");
        assert_eq!(book.title, "日本語");
        assert_eq!(book.author, "著者 太郎");
        assert_eq!(book.author_bio, "1950年生まれ");
        assert_eq!(book.publisher, "岩波書店");
        assert_eq!(book.series, "岩波新書 ； 新赤版 1093");
        assert_eq!(book.published_date, "2007年11月");
        assert_eq!(book.page_count, "240");
        assert_eq!(book.description, "長い紹介");
        assert_eq!(book.table_of_contents, "第一章");
        assert_eq!(
            book.cover_image_url,
            "https://cover.openbd.jp/9784004310938.jpg"
        );
        assert_eq!(book.discovered_at, now());
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let record = decode(full_record());
        assert_eq!(
            normalize(&record, None, now()),
            normalize(&record, None, now())
        );
    }

    #[test]
    fn missing_descriptive_detail_is_rejected() {
        assert!(normalize(&decode(json!({ "onix": {} })), None, now()).is_none());
        assert!(normalize(&decode(json!({ "summary": {} })), None, now()).is_none());
    }

    #[test]
    fn sparse_record_degrades_to_sentinels() {
        let record = decode(json!({ "onix": { "DescriptiveDetail": {} } }));
        let book = normalize(&record, None, now()).unwrap();

        assert_eq!(book.isbn13, NOT_AVAILABLE);
        assert_eq!(book.isbn10, "");
        assert_eq!(book.title, NOT_AVAILABLE);
        assert_eq!(book.author, NOT_AVAILABLE);
        assert_eq!(book.author_bio, "");
        assert_eq!(book.publisher, NOT_AVAILABLE);
        assert_eq!(book.series, "");
        assert_eq!(book.published_date, UNDETERMINED_RELEASE);
        assert_eq!(book.page_count, "");
        assert_eq!(book.description, "");
        assert_eq!(book.table_of_contents, "");
        assert_eq!(book.cover_image_url, "");
    }

    #[test]
    fn isbn_falls_back_to_requested_identifier() {
        let record = decode(json!({
            "onix": { "DescriptiveDetail": {} },
            "summary": { "isbn": "9784000000001" }
        }));
        let book = normalize(&record, Some("9784480069733"), now()).unwrap();
        assert_eq!(book.isbn13, "9784480069733");
        assert_eq!(book.isbn10, "4480069739");

        let book = normalize(&record, None, now()).unwrap();
        assert_eq!(book.isbn13, "9784000000001");
    }

    #[test]
    fn author_falls_back_to_first_contributor() {
        let record = decode(json!({
            "onix": { "DescriptiveDetail": { "Contributor": [
                { "ContributorRole": ["B06"], "PersonName": { "content": "訳者" }, "BiographicalNote": "翻訳家" },
                { "ContributorRole": ["B01"], "PersonName": { "content": "編者" } }
            ] } }
        }));
        let book = normalize(&record, None, now()).unwrap();
        assert_eq!(book.author, "訳者");
        assert_eq!(book.author_bio, "翻訳家");
    }

    #[test]
    fn publisher_falls_back_to_publisher_list() {
        let record = decode(json!({
            "onix": {
                "DescriptiveDetail": {},
                "PublishingDetail": { "Publisher": [ { "PublisherName": "筑摩書房" }, { "PublisherName": "other" } ] }
            }
        }));
        let book = normalize(&record, None, now()).unwrap();
        assert_eq!(book.publisher, "筑摩書房");
    }

    #[test]
    fn cover_requires_front_cover_with_version() {
        let record = decode(json!({
            "onix": {
                "DescriptiveDetail": {},
                "CollateralDetail": { "SupportingResource": [
                    { "ResourceContentType": "01", "ResourceVersion": [] },
                    { "ResourceContentType": "01", "ResourceVersion": { "ResourceLink": "https://example.com/front.jpg" } }
                ] }
            }
        }));
        let book = normalize(&record, None, now()).unwrap();
        assert_eq!(book.cover_image_url, "https://example.com/front.jpg");
    }

    #[test]
    fn series_name_reads_collection_title() {
        let record = decode(full_record());
        assert_eq!(series_name(&record), Some("岩波新書 ； 新赤版 1093"));
        assert_eq!(series_name(&decode(json!({}))), None);
    }
}
