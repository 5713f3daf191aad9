use std::fmt;

/// A conjunctive Ghost NQL filter: `field:value` clauses joined by `+`,
/// where `field:-value` negates the clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: String,
    pub value: String,
    pub negated: bool,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(mut self, field: &str, value: &str) -> Self {
        self.clauses.push(Clause {
            field: field.to_string(),
            value: value.to_string(),
            negated: false,
        });
        self
    }

    pub fn excluding(mut self, field: &str, value: &str) -> Self {
        self.clauses.push(Clause {
            field: field.to_string(),
            value: value.to_string(),
            negated: true,
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negated { "-" } else { "" };
        write!(f, "{}:{}{}", self.field, sign, self.value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            clause.fmt(f)?;
        }
        Ok(())
    }
}
