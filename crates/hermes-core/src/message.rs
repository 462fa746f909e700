//! Type-erased RPC payloads.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::any::Any;

/// A request or response payload flowing through the chain.
///
/// Every `Serialize + Send + Sync + 'static` type is a `Message`, so handlers
/// work with their own concrete types while interceptors only see
/// `&dyn Message`. The trait is object safe; use
/// [`downcast_ref`](trait.Message.html#method.downcast_ref) to get the
/// concrete type back.
///
/// # Example
///
/// ```
/// use hermes_core::Message;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Ping {
///     seq: u32,
/// }
///
/// let msg: Box<dyn Message> = Box::new(Ping { seq: 3 });
/// assert_eq!(msg.downcast_ref::<Ping>().map(|p| p.seq), Some(3));
/// ```
pub trait Message: Any + Send + Sync {
    /// Returns the Rust type name of the payload.
    fn type_name(&self) -> &'static str;

    /// Returns the payload as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Appends the JSON encoding of the payload to `out`.
    ///
    /// With `indent` set the output is pretty-printed using that indent
    /// string, otherwise it is compact.
    fn encode_json(&self, out: &mut Vec<u8>, indent: Option<&[u8]>) -> serde_json::Result<()>;
}

impl<T> Message for T
where
    T: Serialize + Send + Sync + 'static,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn encode_json(&self, out: &mut Vec<u8>, indent: Option<&[u8]>) -> serde_json::Result<()> {
        match indent {
            Some(indent) => {
                let formatter = PrettyFormatter::with_indent(indent);
                let mut serializer = serde_json::Serializer::with_formatter(out, formatter);
                self.serialize(&mut serializer)
            }
            None => serde_json::to_writer(out, self),
        }
    }
}

impl dyn Message {
    /// Returns `true` if the payload is of type `T`.
    #[must_use]
    pub fn is<T: Message>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Returns the payload as `T` if it is of that type.
    #[must_use]
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
