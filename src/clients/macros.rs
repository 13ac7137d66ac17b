/// Generate client methods with oneshot channel boilerplate and automatic tracing.
///
/// The error type must have an `ActorCommunicationError(String)` variant, used
/// when the service has stopped or dropped the responder.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response
                    .await
                    .map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

/// Manual shutdown method shared by every client (no response expected).
macro_rules! client_shutdown {
    ($client:ty, $request:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn shutdown(&self) -> Result<(), String> {
                tracing::debug!("Sending shutdown request");
                self.sender
                    .send($request::Shutdown)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(())
            }
        }
    };
}
