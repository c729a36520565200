//! DynamoDB access for regional food trivia.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;
use tracing::debug;

use crate::{Error, Result};

/// A regional specialty, keyed by `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodRecord {
    pub name: String,
    pub prefecture: String,
    /// Display text per language tag
    pub labels: HashMap<String, String>,
    pub description: Option<String>,
}

impl FoodRecord {
    /// Display text for `lang`, falling back to the key.
    pub fn display_name(&self, lang: &str) -> &str {
        self.labels
            .get(lang)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    /// Parse a table item. Items without `name` or `prefecture` are rejected.
    pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Self> {
        let string = |key: &str| item.get(key).and_then(|v| v.as_s().ok()).cloned();

        let name = string("name")
            .ok_or_else(|| Error::Aws("Food item has no name".to_string()))?;
        let prefecture = string("prefecture")
            .ok_or_else(|| Error::Aws(format!("Food item {} has no prefecture", name)))?;

        let labels = item
            .get("label")
            .and_then(|v| v.as_m().ok())
            .map(|m| {
                m.iter()
                    .filter_map(|(lang, v)| v.as_s().ok().map(|s| (lang.clone(), s.clone())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name,
            prefecture,
            labels,
            description: string("description"),
        })
    }
}

/// Read-only access to food records.
#[async_trait]
pub trait FoodStore: Send + Sync {
    /// First record whose `prefecture` equals the given value.
    async fn find_by_prefecture(&self, prefecture: &str) -> Result<Option<FoodRecord>>;

    /// Record with primary key `name`.
    async fn get(&self, name: &str) -> Result<Option<FoodRecord>>;
}

/// `FoodStore` backed by a DynamoDB table with partition key `name`.
pub struct DynamoFoodStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoFoodStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl FoodStore for DynamoFoodStore {
    async fn find_by_prefecture(&self, prefecture: &str) -> Result<Option<FoodRecord>> {
        let mut start_key = None;

        // Filters apply per page, so keep scanning until a page matches.
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("#prefecture = :prefecture")
                .expression_attribute_names("#prefecture", "prefecture")
                .expression_attribute_values(":prefecture", AttributeValue::S(prefecture.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| Error::Aws(format!("Failed to scan {}: {}", self.table_name, e)))?;

            if let Some(item) = output.items().first() {
                return FoodRecord::from_item(item).map(Some);
            }

            match output.last_evaluated_key() {
                Some(key) => {
                    debug!("No match on this page, continuing scan");
                    start_key = Some(key.clone());
                }
                None => return Ok(None),
            }
        }
    }

    async fn get(&self, name: &str) -> Result<Option<FoodRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("name", AttributeValue::S(name.to_string()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to get {} from {}: {}", name, self.table_name, e)))?;

        output.item().map(FoodRecord::from_item).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pairs: &[(&str, AttributeValue)]) -> HashMap<String, AttributeValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_from_item() {
        let labels = HashMap::from([
            ("ja".to_string(), AttributeValue::S("きりたんぽ".to_string())),
            ("en".to_string(), AttributeValue::S("Kiritanpo".to_string())),
        ]);
        let record = FoodRecord::from_item(&item(&[
            ("name", AttributeValue::S("kiritanpo".to_string())),
            ("prefecture", AttributeValue::S("秋田県".to_string())),
            ("label", AttributeValue::M(labels)),
            ("description", AttributeValue::S("潰したご飯を杉の棒に巻いて焼いたものです。".to_string())),
        ]))
        .unwrap();

        assert_eq!(record.prefecture, "秋田県");
        assert_eq!(record.display_name("ja"), "きりたんぽ");
        assert_eq!(record.display_name("en"), "Kiritanpo");
        assert_eq!(record.display_name("ko"), "kiritanpo");
        assert!(record.description.is_some());
    }

    #[test]
    fn test_optional_attributes() {
        let record = FoodRecord::from_item(&item(&[
            ("name", AttributeValue::S("hoto".to_string())),
            ("prefecture", AttributeValue::S("山梨県".to_string())),
        ]))
        .unwrap();

        assert!(record.labels.is_empty());
        assert_eq!(record.description, None);
        assert_eq!(record.display_name("ja"), "hoto");
    }

    #[test]
    fn test_missing_key_attributes() {
        let err = FoodRecord::from_item(&item(&[(
            "prefecture",
            AttributeValue::S("秋田県".to_string()),
        )]))
        .unwrap_err();
        assert!(matches!(err, Error::Aws(_)));

        let err = FoodRecord::from_item(&item(&[("name", AttributeValue::N("3".to_string()))]))
            .unwrap_err();
        assert!(matches!(err, Error::Aws(_)));
    }
}
