//! Response and cross-validation operations.

use super::MessageExchangeService;
use crate::domain::{Message, MessageType, Response, Status};
use gl_01_record_store::{read_optional, read_record, write_record, LedgerStub};
use shared_types::{Content, CoreError};
use tracing::{debug, info, instrument, warn};

impl MessageExchangeService {
    /// Record a response and its verdict.
    ///
    /// 1. `published` overwrites the routed message (type `Standard`).
    /// 2. The stored response (or an empty `Valid` shell) takes the new
    ///    `subscribed`, `published` and tx time.
    /// 3. `subscribed` is validated against the route's counterpart message,
    ///    read after step 1.
    /// 4. The verdict is stored and returned.
    ///
    /// Any failure returns before the response is written, and the caller's
    /// transaction must then be discarded.
    #[instrument(skip(self, stub, subscribed, published), fields(tx_id = %stub.tx_id()))]
    pub fn respond_to_message(
        &self,
        stub: &mut dyn LedgerStub,
        response_id: &str,
        subscribed: Content,
        published: Content,
    ) -> Result<Status, CoreError> {
        let Some(route) = self.topology.route(response_id) else {
            warn!(response_id, "Unknown response ID");
            self.stats.write().rejected_inputs += 1;
            return Err(CoreError::invalid_response_id(response_id));
        };

        self.overwrite_message(stub, &route.updates, published.clone(), MessageType::Standard)?;

        let mut response = match read_optional::<Response>(stub, response_id)? {
            Some(existing) => existing,
            None => {
                debug!(response_id, "No stored response, starting from an empty shell");
                Response::shell(response_id, "")
            }
        };
        response.subscribed = subscribed;
        response.published = published;
        response.timestamp = stub.tx_timestamp().to_rfc3339();

        let counterpart: Message = read_record(stub, &route.validates_against)?;
        let matched = self
            .config
            .match_policy
            .matches(&counterpart.content, &response.subscribed);
        self.record_verdict(matched);

        response.status = Status::from_verdict(matched);
        write_record(stub, response_id, &response)?;

        info!(
            response_id,
            updated = %route.updates,
            validated_against = %route.validates_against,
            status = %response.status,
            "Response recorded"
        );
        Ok(response.status)
    }

    #[instrument(skip(self, stub))]
    pub fn read_response(&self, stub: &mut dyn LedgerStub, id: &str) -> Result<Response, CoreError> {
        if self.topology.route(id).is_none() {
            self.stats.write().rejected_inputs += 1;
            return Err(CoreError::invalid_response_id(id));
        }
        read_record(stub, id)
    }
}
