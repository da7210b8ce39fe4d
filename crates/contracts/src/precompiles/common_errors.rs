use alloy::sol;

sol! {
    /// Error returned when a function selector is not recognized
    #[derive(Debug, PartialEq, Eq)]
    error UnknownFunctionSelector(bytes4 selector);

    /// Error returned when a state-changing method is reached through a static call
    #[derive(Debug, PartialEq, Eq)]
    error StaticCallNotAllowed();
}
