pub mod catalog;

impl std::fmt::Display for catalog::Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.entity.is_empty(), self.verb.is_empty()) {
            (false, false) => write!(f, "{}.{}: {}", self.entity, self.verb, self.message),
            (false, true) => write!(f, "{}: {}", self.entity, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for catalog::Fault {}

impl catalog::Fault {
    /// Decode a Fault out of the details payload of a gRPC status,
    /// if one is attached.
    pub fn from_status(status: &tonic::Status) -> Option<Self> {
        if status.details().is_empty() {
            return None;
        }
        <Self as prost::Message>::decode(status.details()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::catalog::Fault;

    #[test]
    fn fault_display() {
        let fault = Fault {
            entity: "Metadata.Entity".to_string(),
            verb: "Unmanage".to_string(),
            message: "verb is not supported".to_string(),
            detail: String::new(),
        };
        assert_eq!(
            fault.to_string(),
            "Metadata.Entity.Unmanage: verb is not supported"
        );

        let fault = Fault {
            entity: "swis://host/Node/1".to_string(),
            verb: String::new(),
            message: "no such entity".to_string(),
            detail: String::new(),
        };
        assert_eq!(fault.to_string(), "swis://host/Node/1: no such entity");

        let fault = Fault {
            message: "internal error".to_string(),
            ..Default::default()
        };
        assert_eq!(fault.to_string(), "internal error");
    }

    #[test]
    fn fault_from_status() {
        use prost::Message;

        let fault = Fault {
            entity: "Node".to_string(),
            message: "boom".to_string(),
            ..Default::default()
        };
        let status = tonic::Status::with_details(
            tonic::Code::FailedPrecondition,
            "boom",
            fault.encode_to_vec().into(),
        );
        assert_eq!(Fault::from_status(&status), Some(fault));

        let status = tonic::Status::internal("plain transport-level status");
        assert_eq!(Fault::from_status(&status), None);
    }
}
