//! Service-name derivation helpers.

use url::Url;

use crate::activation::context::ActivationContext;

/// Name of the stateful data service within the application.
const DATA_SERVICE_NAME: &str = "VotingData";

/// Derive the fully qualified name of the collaborating data service.
///
/// Example: `fabric:/VotingApplication` -> `fabric:/VotingApplication/VotingData`.
pub fn data_service_uri(context: &ActivationContext) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        context.application_name(),
        DATA_SERVICE_NAME
    ))
}
