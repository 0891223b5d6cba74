use serde_json::{Value as Json, json};

use crate::record::Record;

/// Encode a record in the remote service's JSON layout.
///
/// ```text
/// {"name": {"uniqueName", "sortAscending", "holdoutRecord"},
///  "structuredData": [{"name", "value", "dataType", "target"}],
///  "unstructuredData": [{"data", "fileType", "groupByName"}]}
/// ```
pub fn encode_record(record: &Record) -> Json {
    let structured: Vec<Json> = record
        .structured_data()
        .iter()
        .map(|item| {
            json!({
                "name": item.name,
                "value": item.value,
                "dataType": item.data_type.name(),
                "target": item.target.name(),
            })
        })
        .collect();
    let unstructured: Vec<Json> = record
        .unstructured_data()
        .iter()
        .map(|item| {
            json!({
                "data": item.data_uri,
                "fileType": item.file_type.name(),
                "groupByName": item.group_by,
            })
        })
        .collect();
    json!({
        "name": {
            "uniqueName": record.name(),
            "sortAscending": true,
            "holdoutRecord": true,
        },
        "structuredData": structured,
        "unstructuredData": unstructured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FileType, StructuredData, Target, UnstructuredData};

    #[test]
    fn encodes_record_layout() {
        let record = Record::assemble(
            "house_1",
            vec![StructuredData::continuous("price", 100000).with_target(Target::Yes)],
            vec![UnstructuredData::new("https://example.com/a.jpg", FileType::Image).with_group("front")],
        )
        .unwrap();
        let encoded = encode_record(&record);
        assert_eq!(encoded["name"]["uniqueName"], "house_1");
        assert_eq!(encoded["structuredData"][0]["value"], 100000);
        assert_eq!(encoded["structuredData"][0]["dataType"], "CONTINUOUS");
        assert_eq!(encoded["structuredData"][0]["target"], "YES");
        assert_eq!(encoded["unstructuredData"][0]["fileType"], "IMAGE");
        assert_eq!(encoded["unstructuredData"][0]["groupByName"], "front");
    }
}
