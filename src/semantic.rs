//! Two-phase-free semantic analysis: a single walk over the AST that
//! maintains a scope stack, builds a symbol table as it goes, and
//! reports every diagnostic it can rather than stopping at the first.
//!
//! Scopes nest global → function → block. A name may be redeclared in a
//! child scope (shadowing is allowed) but not twice in the same scope.
//! The "non-void function must return" check is flat: it only asks
//! whether a `return` statement appears anywhere in the function body,
//! not whether every control path reaches one.

use std::collections::HashMap;

use crate::ast::{BinaryOp, DataType, Expr, Literal, Program, Stmt, UnaryOp};
use crate::diagnostics::{AnalysisError, AnalysisWarning, Span};

#[derive(Debug, Clone, PartialEq)]
enum Symbol {
    Variable(DataType),
    Function {
        params: Vec<DataType>,
        return_type: DataType,
    },
}

pub struct AnalysisResult {
    pub errors: Vec<AnalysisError>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Analyzer {
    scopes: Vec<HashMap<String, Symbol>>,
    errors: Vec<AnalysisError>,
    warnings: Vec<AnalysisWarning>,
    in_function: bool,
    current_return_type: DataType,
    has_return_statement: bool,
}

fn is_numeric(ty: DataType) -> bool {
    matches!(ty, DataType::Int | DataType::Float)
}

/// `expected` accepts `actual` as-is, or widened (int passed where float
/// is expected).
fn types_compatible(expected: DataType, actual: DataType) -> bool {
    expected == actual || (expected == DataType::Float && actual == DataType::Int)
}

impl Analyzer {
    fn new() -> Self {
        let mut global = HashMap::new();
        global.insert(
            "print".to_string(),
            Symbol::Function {
                params: vec![],
                return_type: DataType::Void,
            },
        );
        global.insert(
            "type".to_string(),
            Symbol::Function {
                params: vec![],
                return_type: DataType::String,
            },
        );
        global.insert(
            "len".to_string(),
            Symbol::Function {
                params: vec![DataType::String],
                return_type: DataType::Int,
            },
        );

        Self {
            scopes: vec![global],
            errors: Vec::new(),
            warnings: Vec::new(),
            in_function: false,
            current_return_type: DataType::Void,
            has_return_statement: false,
        }
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(AnalysisError {
            message: message.into(),
            span,
        });
    }

    fn warn(&mut self, span: Span, message: impl Into<String>) {
        self.warnings.push(AnalysisWarning {
            message: message.into(),
            span,
        });
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, symbol: Symbol) {
        self.scopes
            .last_mut()
            .expect("at least one scope always active")
            .insert(name.to_string(), symbol);
    }

    fn declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .expect("at least one scope always active")
            .contains_key(name)
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn check_program(&mut self, program: &Program) {
        self.push_scope();
        for stmt in &program.statements {
            self.check_stmt(stmt);
        }
        self.pop_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl { name, ty, initializer, span } => {
                self.check_var_decl(name, *ty, initializer, *span);
            }
            Stmt::FuncDecl { name, params, return_type, body, span } => {
                self.check_func_decl(name, params, *return_type, body, *span);
            }
            Stmt::Block { statements, .. } => {
                self.push_scope();
                for s in statements {
                    self.check_stmt(s);
                }
                self.pop_scope();
            }
            Stmt::If { condition, then_branch, else_branch, span } => {
                if let Some(cond_ty) = self.check_expr(condition) {
                    if cond_ty != DataType::Bool {
                        self.error(
                            *span,
                            format!("'if' condition must be bool, found {cond_ty}"),
                        );
                    }
                }
                self.check_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            Stmt::While { condition, body, span } => {
                if let Some(cond_ty) = self.check_expr(condition) {
                    if cond_ty != DataType::Bool {
                        self.error(
                            *span,
                            format!("'while' condition must be bool, found {cond_ty}"),
                        );
                    }
                }
                self.check_stmt(body);
            }
            Stmt::Return { value, span } => self.check_return(value.as_ref(), *span),
            Stmt::Expr { expr, .. } => {
                self.check_expr(expr);
            }
        }
    }

    fn check_var_decl(&mut self, name: &str, ty: DataType, initializer: &Expr, span: Span) {
        if self.declared_in_current_scope(name) {
            self.error(span, format!("variable '{name}' already declared in this scope"));
            return;
        }

        let Some(init_ty) = self.check_expr(initializer) else {
            return;
        };

        if !types_compatible(ty, init_ty) {
            self.error(
                span,
                format!("incompatible initializer: declared {ty}, found {init_ty}"),
            );
            return;
        }

        self.declare(name, Symbol::Variable(ty));
    }

    fn check_func_decl(
        &mut self,
        name: &str,
        params: &[crate::ast::Param],
        return_type: DataType,
        body: &Stmt,
        span: Span,
    ) {
        if self.declared_in_current_scope(name) {
            self.error(span, format!("function '{name}' already declared in this scope"));
            return;
        }

        let param_types: Vec<DataType> = params.iter().map(|p| p.ty).collect();
        self.declare(
            name,
            Symbol::Function {
                params: param_types,
                return_type,
            },
        );

        let saved_in_function = self.in_function;
        let saved_return_type = self.current_return_type;
        let saved_has_return = self.has_return_statement;
        self.in_function = true;
        self.current_return_type = return_type;
        self.has_return_statement = false;

        self.push_scope();
        for param in params {
            self.declare(&param.name, Symbol::Variable(param.ty));
        }
        self.check_stmt(body);

        if return_type != DataType::Void && !self.has_return_statement {
            self.error(
                span,
                format!("function '{name}' of type {return_type} must return a value"),
            );
        }
        self.pop_scope();

        self.in_function = saved_in_function;
        self.current_return_type = saved_return_type;
        self.has_return_statement = saved_has_return;
    }

    fn check_return(&mut self, value: Option<&Expr>, span: Span) {
        if !self.in_function {
            self.error(span, "'return' outside of a function");
            return;
        }
        self.has_return_statement = true;

        if self.current_return_type == DataType::Void {
            if value.is_some() {
                self.error(span, "void function cannot return a value");
            }
            return;
        }

        match value {
            None => {
                self.error(
                    span,
                    format!("expected a return value of type {}", self.current_return_type),
                );
            }
            Some(value) => {
                if let Some(value_ty) = self.check_expr(value) {
                    if !types_compatible(self.current_return_type, value_ty) {
                        self.error(
                            span,
                            format!(
                                "incompatible return type: expected {}, found {value_ty}",
                                self.current_return_type
                            ),
                        );
                    }
                }
            }
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Option<DataType> {
        match expr {
            Expr::Literal { value, .. } => Some(match value {
                Literal::Int(_) => DataType::Int,
                Literal::Float(_) => DataType::Float,
                Literal::Str(_) => DataType::String,
                Literal::Bool(_) => DataType::Bool,
            }),
            Expr::Var { name, span } => match self.lookup(name) {
                Some(Symbol::Variable(ty)) => Some(*ty),
                Some(Symbol::Function { .. }) | None => {
                    self.error(*span, format!("variable '{name}' not declared"));
                    None
                }
            },
            Expr::Unary { op, operand, span } => self.check_unary(*op, operand, *span),
            Expr::Binary { op, left, right, span } => self.check_binary(*op, left, right, *span),
            Expr::Assign { name, value, span } => self.check_assign(name, value, *span),
            Expr::Call { callee, args, span } => self.check_call(callee, args, *span),
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> Option<DataType> {
        let operand_ty = self.check_expr(operand)?;
        match op {
            UnaryOp::Neg => {
                if is_numeric(operand_ty) {
                    Some(operand_ty)
                } else {
                    self.error(
                        span,
                        format!("unary '-' not supported for type {operand_ty}"),
                    );
                    None
                }
            }
        }
    }

    fn check_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, span: Span) -> Option<DataType> {
        let left_ty = self.check_expr(left);
        let right_ty = self.check_expr(right);
        let (left_ty, right_ty) = (left_ty?, right_ty?);

        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                if is_numeric(left_ty) && is_numeric(right_ty) {
                    if left_ty == DataType::Int && right_ty == DataType::Int && op != BinaryOp::Div {
                        Some(DataType::Int)
                    } else {
                        if left_ty == DataType::Int {
                            self.warn(span, "implicit widening from int to float");
                        }
                        Some(DataType::Float)
                    }
                } else if op == BinaryOp::Add && left_ty == DataType::String && right_ty == DataType::String {
                    Some(DataType::String)
                } else {
                    self.error(
                        span,
                        format!("operator not supported for types {left_ty} and {right_ty}"),
                    );
                    None
                }
            }
            // All six comparison operators require the same comparability:
            // operands of the same primitive type (excluding void), or
            // both numeric (with a widening warning on a cross-numeric
            // pair). `==`/`!=` are not exempt from this.
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Less
            | BinaryOp::LessEq
            | BinaryOp::Greater
            | BinaryOp::GreaterEq => {
                if is_numeric(left_ty) && is_numeric(right_ty) {
                    if left_ty != right_ty {
                        self.warn(span, "implicit widening in comparison");
                    }
                    Some(DataType::Bool)
                } else if left_ty == right_ty && left_ty != DataType::Void {
                    Some(DataType::Bool)
                } else {
                    self.error(
                        span,
                        format!("types {left_ty} and {right_ty} are not comparable"),
                    );
                    None
                }
            }
        }
    }

    fn check_assign(&mut self, name: &str, value: &Expr, span: Span) -> Option<DataType> {
        let var_ty = match self.lookup(name) {
            Some(Symbol::Variable(ty)) => *ty,
            Some(Symbol::Function { .. }) | None => {
                self.error(span, format!("variable '{name}' not declared"));
                return None;
            }
        };

        let value_ty = self.check_expr(value)?;
        if !types_compatible(var_ty, value_ty) {
            self.error(
                span,
                format!("incompatible assignment: variable is {var_ty}, value is {value_ty}"),
            );
            return None;
        }
        Some(var_ty)
    }

    fn check_call(&mut self, callee: &str, args: &[Expr], span: Span) -> Option<DataType> {
        let Some(Symbol::Function { params, return_type }) = self.lookup(callee).cloned() else {
            self.error(span, format!("function '{callee}' not declared"));
            for arg in args {
                self.check_expr(arg);
            }
            return None;
        };

        // `print` is the one arity-exempt built-in: it accepts any number
        // of arguments of any type.
        if callee == "print" || callee == "type" {
            let mut ok = true;
            for arg in args {
                if self.check_expr(arg).is_none() {
                    ok = false;
                }
            }
            return ok.then_some(return_type);
        }

        if args.len() != params.len() {
            self.error(
                span,
                format!(
                    "wrong number of arguments for '{callee}': expected {}, found {}",
                    params.len(),
                    args.len()
                ),
            );
            for arg in args {
                self.check_expr(arg);
            }
            return None;
        }

        let mut ok = true;
        for (arg, param_ty) in args.iter().zip(params.iter()) {
            match self.check_expr(arg) {
                Some(arg_ty) if types_compatible(*param_ty, arg_ty) => {}
                Some(arg_ty) => {
                    self.error(
                        span,
                        format!(
                            "incompatible argument for '{callee}': expected {param_ty}, found {arg_ty}"
                        ),
                    );
                    ok = false;
                }
                None => ok = false,
            }
        }

        ok.then_some(return_type)
    }
}

pub fn analyze(program: &Program) -> AnalysisResult {
    let mut analyzer = Analyzer::new();
    analyzer.check_program(program);
    AnalysisResult {
        errors: analyzer.errors,
        warnings: analyzer.warnings,
    }
}
