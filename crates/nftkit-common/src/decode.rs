//! Receipt decoding
//!
//! Extracts domain identifiers from the event log of a transaction receipt.

use serde_json::Value;

use crate::error::Error;
use crate::types::{CollectionId, Receipt, TokenId};

/// Event emitted once per token minted
pub const MINT_SUCCESS_EVENT: &str = "MintSuccess";

/// Parameter carrying the minted token id
pub const TOKEN_ID_PARAM: &str = "token_id";

/// Receipt decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiptDecoder;

impl ReceiptDecoder {
    /// Token ids minted by a transaction
    ///
    /// Ids are returned in reverse emission order: the first `MintSuccess` event of the log ends
    /// up last. Downstream price pairing relies on this order.
    pub fn decode_minted_token_ids(receipt: &Receipt) -> Result<Vec<TokenId>, Error> {
        let mut token_ids = receipt
            .event_logs
            .iter()
            .filter(|event| event.name == MINT_SUCCESS_EVENT)
            .map(|event| {
                let value = event.param(TOKEN_ID_PARAM).ok_or_else(|| {
                    Error::MalformedReceipt(format!(
                        "`{MINT_SUCCESS_EVENT}` event without `{TOKEN_ID_PARAM}`"
                    ))
                })?;

                token_id_from_value(value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        token_ids.reverse();

        tracing::debug!("Decoded {} minted token ids", token_ids.len());

        Ok(token_ids)
    }

    /// Collection id created by an auction start transaction
    ///
    /// The auction contract does not define the event carrying the collection id yet.
    pub fn decode_collection_id(_receipt: &Receipt) -> Result<CollectionId, Error> {
        Err(Error::NotImplemented("collection id decoding"))
    }
}

fn token_id_from_value(value: &Value) -> Result<TokenId, Error> {
    match value {
        Value::String(id) if !id.is_empty() => Ok(TokenId::new(id.as_str())),
        Value::Number(id) => Ok(TokenId::new(id.to_string())),
        other => Err(Error::MalformedReceipt(format!(
            "unexpected `{TOKEN_ID_PARAM}` value: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{Event, EventParam};

    fn mint_success(token_id: Value) -> Event {
        Event::new(
            MINT_SUCCESS_EVENT,
            vec![
                EventParam::new("recipient", "ByStr20", json!("0x1234")),
                EventParam::new(TOKEN_ID_PARAM, "Uint256", token_id),
            ],
        )
    }

    #[test]
    fn test_token_ids_reverse_emission_order() {
        let receipt = Receipt::success(vec![
            mint_success(json!("A")),
            mint_success(json!("B")),
            mint_success(json!("C")),
        ]);

        let ids = ReceiptDecoder::decode_minted_token_ids(&receipt).expect("valid receipt");

        assert_eq!(
            ids,
            vec![TokenId::new("C"), TokenId::new("B"), TokenId::new("A")]
        );
    }

    #[test]
    fn test_other_events_are_ignored() {
        let receipt = Receipt::success(vec![
            Event::new("TransferSuccess", vec![]),
            mint_success(json!("1")),
            Event::new(
                "Minted",
                vec![EventParam::new(TOKEN_ID_PARAM, "Uint256", json!("99"))],
            ),
            mint_success(json!(2)),
        ]);

        let ids = ReceiptDecoder::decode_minted_token_ids(&receipt).expect("valid receipt");

        assert_eq!(ids, vec![TokenId::from(2), TokenId::from(1)]);
    }

    #[test]
    fn test_no_mint_events() {
        let receipt = Receipt::success(vec![Event::new("TransferSuccess", vec![])]);

        let ids = ReceiptDecoder::decode_minted_token_ids(&receipt).expect("valid receipt");

        assert!(ids.is_empty());
    }

    #[test]
    fn test_missing_token_id_is_malformed() {
        let receipt = Receipt::success(vec![
            mint_success(json!("1")),
            Event::new(
                MINT_SUCCESS_EVENT,
                vec![EventParam::new("recipient", "ByStr20", json!("0x1234"))],
            ),
        ]);

        let result = ReceiptDecoder::decode_minted_token_ids(&receipt);

        assert!(matches!(result, Err(Error::MalformedReceipt(_))));
    }

    #[test]
    fn test_unexpected_token_id_value_is_malformed() {
        let receipt = Receipt::success(vec![mint_success(json!({ "nested": true }))]);

        let result = ReceiptDecoder::decode_minted_token_ids(&receipt);

        assert!(matches!(result, Err(Error::MalformedReceipt(_))));
    }

    #[test]
    fn test_collection_id_not_implemented() {
        let result = ReceiptDecoder::decode_collection_id(&Receipt::success(vec![]));

        assert!(matches!(result, Err(Error::NotImplemented(_))));
    }
}
