use super::Value;

/// One result row of a projection or aggregate query
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tuple notation; a single value keeps its trailing comma, `('Alan Turing',)`.
impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_tuple() {
        let row = Row::new(vec![Value::from("Alan Turing")]);
        assert_eq!(row.to_string(), "('Alan Turing',)");
    }

    #[test]
    fn test_pair_tuple() {
        let row = Row::new(vec![Value::from("Alan Turing"), Value::from(11)]);
        assert_eq!(row.to_string(), "('Alan Turing', 11)");
    }
}
