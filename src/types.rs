/// Unique record name (also the record id on the remote service).
/// Example: `house_0042`
pub type RecordName = String;
/// Name of a structured data item, unique within its record.
/// Examples: `price`, `latitude`, `square_feet`
pub type FieldName = String;
/// Opaque configuration value emitted by a generator and consumed by a builder.
/// Examples: `file:///data/houses/0042`, `row:1187`, `https://example.com/items/9`
pub type ConfigValue = String;
/// URI pointing at unstructured data.
/// Examples: `file:///data/houses/0042/front.jpg`, `https://example.com/a.png`
pub type DataUri = String;
/// Identifier of a dataset on the remote service.
/// Example: `9d1f0c7e-house-prices`
pub type DatasetId = String;
/// Monotonic model version within a dataset.
/// Example: `3`
pub type ModelVersion = u64;
/// Human-readable accessibility diagnostic recorded by validation.
/// Examples: `OK`, `file missing`, `not a file`, `Unknown URL scheme ftp`
pub type Diagnostic = String;
